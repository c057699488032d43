//! Incremental median aggregate for windowed event streams.
//!
//! A host stream engine feeds an aggregator one value at a time as events
//! enter and leave a window, and reads the median back after every change.
//! Values are kept in an order-statistic store so each update and each rank
//! query costs O(log n).
//!
//! ```
//! use stats_median::{AttributeType, MedianFactory};
//!
//! let mut median = MedianFactory::default().create(AttributeType::Int).unwrap();
//! assert_eq!(median.add(1i32).unwrap(), 1.0);
//! assert_eq!(median.add(2i32).unwrap(), 1.5);
//! assert_eq!(median.remove(1i32).unwrap(), 2.0);
//! ```

pub mod aggregator;
pub mod algebra;
pub mod checkpoint;
pub mod config;
mod error;
pub mod factory;
pub mod kind;
pub mod store;

pub use aggregator::MedianAggregator;
pub use algebra::{MedianValue, F32, F64};
pub use checkpoint::{Checkpoint, StateMap};
pub use config::{MedianConfig, MissingValuePolicy, StoreBackend};
pub use error::MedianError;
pub use factory::{Median, MedianFactory};
pub use kind::{AttributeType, NumericKind, Value};

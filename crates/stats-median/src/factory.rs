//! Selecting the aggregator specialization for a column type.
//!
//! The host resolves the input column type once, when a query is
//! instantiated.  [`MedianFactory`] maps it to one of four specialized
//! aggregators wrapped in [`Median`]; per-event calls then dispatch on the
//! variant without inspecting the value's type again.

use crate::{
    aggregator::MedianAggregator,
    algebra::{MedianValue, F32, F64},
    checkpoint::{Checkpoint, StateMap},
    config::MedianConfig,
    kind::{AttributeType, NumericKind, Value},
    MedianError,
};
use tracing::debug;

/// A median aggregator bound to one numeric kind.
#[derive(Debug)]
pub enum Median {
    Int32(MedianAggregator<i32>),
    Int64(MedianAggregator<i64>),
    Float32(MedianAggregator<F32>),
    Float64(MedianAggregator<F64>),
}

macro_rules! dispatch {
    ($self:expr, $agg:ident => $body:expr) => {
        match $self {
            Median::Int32($agg) => $body,
            Median::Int64($agg) => $body,
            Median::Float32($agg) => $body,
            Median::Float64($agg) => $body,
        }
    };
}

fn unwrap_value<T: MedianValue>(value: Value) -> Result<T, MedianError> {
    T::from_value(value).ok_or(MedianError::KindMismatch {
        expected: T::KIND,
        actual: value.kind(),
    })
}

impl Median {
    pub fn kind(&self) -> NumericKind {
        dispatch!(self, agg => agg.kind())
    }

    /// Add `value` and return the new median.  Fails without touching the
    /// aggregator if `value` is not of the aggregator's kind.
    pub fn add(&mut self, value: impl Into<Value>) -> Result<f64, MedianError> {
        let value = value.into();
        Ok(dispatch!(self, agg => agg.add(unwrap_value(value)?)))
    }

    /// Remove one occurrence of `value` and return the new median.
    pub fn remove(&mut self, value: impl Into<Value>) -> Result<f64, MedianError> {
        let value = value.into();
        dispatch!(self, agg => agg.remove(unwrap_value(value)?))
    }

    pub fn reset(&mut self) -> f64 {
        dispatch!(self, agg => agg.reset())
    }

    pub fn count(&self) -> u64 {
        dispatch!(self, agg => agg.count())
    }

    pub fn median(&self) -> f64 {
        dispatch!(self, agg => agg.median())
    }

    pub fn len(&self) -> usize {
        dispatch!(self, agg => agg.len())
    }

    pub fn is_empty(&self) -> bool {
        dispatch!(self, agg => agg.is_empty())
    }

    /// Window values in ascending order.
    pub fn values(&self) -> Vec<Value> {
        dispatch!(self, agg => agg.values().into_iter().map(MedianValue::into_value).collect())
    }

    pub fn size_bytes(&self) -> usize {
        dispatch!(self, agg => agg.size_bytes())
    }

    pub fn is_quiescent(&self) -> bool {
        dispatch!(self, agg => agg.is_quiescent())
    }

    pub fn snapshot(&self) -> Checkpoint {
        dispatch!(self, agg => agg.snapshot())
    }

    pub fn restore(&mut self, checkpoint: &Checkpoint) {
        dispatch!(self, agg => agg.restore(checkpoint))
    }

    pub fn restore_state_map(&mut self, state: &StateMap) -> Result<(), MedianError> {
        dispatch!(self, agg => agg.restore_state_map(state))
    }
}

/// Creates [`Median`] aggregators for the `stats:median` function.
#[derive(Clone, Debug, Default)]
pub struct MedianFactory {
    config: MedianConfig,
}

impl MedianFactory {
    pub const NAMESPACE: &'static str = "stats";
    pub const FUNCTION_NAME: &'static str = "median";

    pub fn new(config: MedianConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MedianConfig {
        &self.config
    }

    /// The median is reported as a double for every input kind.
    pub fn return_type() -> AttributeType {
        AttributeType::Double
    }

    /// Create an aggregator for a column of type `ty`.
    pub fn create(&self, ty: AttributeType) -> Result<Median, MedianError> {
        let kind = NumericKind::try_from(ty)?;
        Ok(self.create_kind(kind))
    }

    /// Create an aggregator for the argument types of a `median(...)` call,
    /// which must have exactly one argument.
    pub fn create_for_arguments(&self, args: &[AttributeType]) -> Result<Median, MedianError> {
        match args {
            [ty] => self.create(*ty),
            _ => Err(MedianError::InvalidArity { actual: args.len() }),
        }
    }

    pub fn create_kind(&self, kind: NumericKind) -> Median {
        debug!(%kind, store = ?self.config.store, "creating median aggregator");
        match kind {
            NumericKind::Int32 => Median::Int32(MedianAggregator::new(&self.config)),
            NumericKind::Int64 => Median::Int64(MedianAggregator::new(&self.config)),
            NumericKind::Float32 => Median::Float32(MedianAggregator::new(&self.config)),
            NumericKind::Float64 => Median::Float64(MedianAggregator::new(&self.config)),
        }
    }
}

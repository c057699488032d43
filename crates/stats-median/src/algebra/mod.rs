//! Numeric types the median aggregate is defined over.

mod floats;

pub use floats::{F32, F64};

use crate::kind::{NumericKind, Value};
use size_of::SizeOf;
use std::fmt::Debug;

/// A numeric type the median can be computed over.
///
/// Implementations bind the midpoint arithmetic for one [`NumericKind`] at
/// compile time, so the aggregator never inspects value types on the
/// add/remove path.
pub trait MedianValue: Copy + Ord + Debug + SizeOf + Send + Sync + 'static {
    /// The kind every value of this type belongs to.
    const KIND: NumericKind;

    /// Converts a single value to the median's output type.
    fn to_f64(self) -> f64;

    /// Sum of two values as a real number, used to average the two middle
    /// values of an even-sized window.
    fn sum(a: Self, b: Self) -> f64;

    /// Unwraps a dynamically typed value, returning `None` on a kind mismatch.
    fn from_value(value: Value) -> Option<Self>;

    fn into_value(self) -> Value;
}

impl MedianValue for i32 {
    const KIND: NumericKind = NumericKind::Int32;

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn sum(a: Self, b: Self) -> f64 {
        (a as i64 + b as i64) as f64
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Int32(v) => Some(v),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Int32(self)
    }
}

impl MedianValue for i64 {
    const KIND: NumericKind = NumericKind::Int64;

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn sum(a: Self, b: Self) -> f64 {
        (a as i128 + b as i128) as f64
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Int64(v) => Some(v),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Int64(self)
    }
}

impl MedianValue for F32 {
    const KIND: NumericKind = NumericKind::Float32;

    #[inline]
    fn to_f64(self) -> f64 {
        self.into_inner() as f64
    }

    #[inline]
    fn sum(a: Self, b: Self) -> f64 {
        a.into_inner() as f64 + b.into_inner() as f64
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Float32(v) => Some(F32::new(v)),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Float32(self.into_inner())
    }
}

impl MedianValue for F64 {
    const KIND: NumericKind = NumericKind::Float64;

    #[inline]
    fn to_f64(self) -> f64 {
        self.into_inner()
    }

    #[inline]
    fn sum(a: Self, b: Self) -> f64 {
        a.into_inner() + b.into_inner()
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Float64(v) => Some(F64::new(v)),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Float64(self.into_inner())
    }
}

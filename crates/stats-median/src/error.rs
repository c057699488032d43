use crate::kind::NumericKind;
use serde::Serialize;
use std::borrow::Cow;
use thiserror::Error;

/// Errors reported by the median aggregate.
///
/// None of these are transient: they signal either a mistake in query
/// construction or a broken caller contract, and retrying the same call
/// produces the same error.
#[derive(Clone, Debug, Error, PartialEq, Serialize)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum MedianError {
    /// The declared column type has no numeric kind the median supports.
    #[error("median is not supported for attribute type '{type_name}'")]
    UnsupportedKind { type_name: String },

    /// The median takes exactly one argument.
    #[error("median aggregator has to have exactly 1 parameter, currently {actual} parameters are provided")]
    InvalidArity { actual: usize },

    /// A checkpoint blob lacks a required field or holds a value of the wrong kind.
    #[error("malformed median checkpoint: field '{field}' {reason}")]
    MalformedCheckpoint { field: String, reason: String },

    /// `remove` was called for a value that is not in the window.
    #[error("cannot remove {value}: no such value in the window")]
    ValueNotPresent { value: String },

    /// A value of one kind was handed to an aggregator bound to another.
    #[error("median bound to {expected} received a {actual} value")]
    KindMismatch {
        expected: NumericKind,
        actual: NumericKind,
    },

    #[error("invalid median configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl MedianError {
    /// Identifying name of the error.
    pub fn error_code(&self) -> Cow<'static, str> {
        match self {
            Self::UnsupportedKind { .. } => Cow::from("UnsupportedKind"),
            Self::InvalidArity { .. } => Cow::from("InvalidArity"),
            Self::MalformedCheckpoint { .. } => Cow::from("MalformedCheckpoint"),
            Self::ValueNotPresent { .. } => Cow::from("ValueNotPresent"),
            Self::KindMismatch { .. } => Cow::from("KindMismatch"),
            Self::InvalidConfig { .. } => Cow::from("InvalidConfig"),
        }
    }

    pub(crate) fn malformed(field: &str, reason: impl Into<String>) -> Self {
        Self::MalformedCheckpoint {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

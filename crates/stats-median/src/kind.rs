//! Column types declared by the host and the numeric kinds a median can be
//! computed over.

use crate::MedianError;
use serde::{Deserialize, Serialize};
use std::{
    fmt::{self, Display},
    str::FromStr,
};

/// Attribute types a host stream definition can declare for a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    String,
    Int,
    Long,
    Float,
    Double,
    Bool,
    Object,
}

impl AttributeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::Bool => "bool",
            Self::Object => "object",
        }
    }
}

impl Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fixed numeric representation an aggregator is bound to for its
/// whole lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericKind {
    Int32,
    Int64,
    Float32,
    Float64,
}

impl NumericKind {
    pub const ALL: [NumericKind; 4] = [
        NumericKind::Int32,
        NumericKind::Int64,
        NumericKind::Float32,
        NumericKind::Float64,
    ];

    /// The host attribute type this kind corresponds to.
    pub fn attribute_type(&self) -> AttributeType {
        match self {
            Self::Int32 => AttributeType::Int,
            Self::Int64 => AttributeType::Long,
            Self::Float32 => AttributeType::Float,
            Self::Float64 => AttributeType::Double,
        }
    }
}

impl Display for NumericKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
        })
    }
}

impl TryFrom<AttributeType> for NumericKind {
    type Error = MedianError;

    fn try_from(ty: AttributeType) -> Result<Self, Self::Error> {
        match ty {
            AttributeType::Int => Ok(Self::Int32),
            AttributeType::Long => Ok(Self::Int64),
            AttributeType::Float => Ok(Self::Float32),
            AttributeType::Double => Ok(Self::Float64),
            other => Err(MedianError::UnsupportedKind {
                type_name: other.to_string(),
            }),
        }
    }
}

/// Parses both the host's attribute names (`int`, `long`, `float`,
/// `double`) and this crate's own kind names (`int32`, ...).
impl FromStr for NumericKind {
    type Err = MedianError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "int" | "int32" => Ok(Self::Int32),
            "long" | "int64" => Ok(Self::Int64),
            "float" | "float32" => Ok(Self::Float32),
            "double" | "float64" => Ok(Self::Float64),
            _ => Err(MedianError::UnsupportedKind {
                type_name: s.to_string(),
            }),
        }
    }
}

/// A single observation as handed over by the host, tagged with its kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
}

impl Value {
    pub fn kind(&self) -> NumericKind {
        match self {
            Self::Int32(_) => NumericKind::Int32,
            Self::Int64(_) => NumericKind::Int64,
            Self::Float32(_) => NumericKind::Float32,
            Self::Float64(_) => NumericKind::Float64,
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float64(v)
    }
}

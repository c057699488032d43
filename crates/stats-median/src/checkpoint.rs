//! Checkpoint state of a median aggregator.
//!
//! A checkpoint holds the count and the last reported median, never the
//! window contents.  It travels either as a [`StateMap`] (the named-field
//! blob handed to the host's state store) or as validated `rkyv` bytes.

use crate::MedianError;
use rkyv::{Archive, Deserialize as RkyvDeserialize, Serialize as RkyvSerialize};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// Opaque named-field state blob exchanged with the host.
pub type StateMap = BTreeMap<String, JsonValue>;

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Serialize,
    Deserialize,
    Archive,
    RkyvSerialize,
    RkyvDeserialize,
)]
#[archive(check_bytes)]
pub struct Checkpoint {
    #[serde(rename = "Count")]
    pub count: u64,
    #[serde(rename = "Median")]
    pub median: f64,
}

impl Checkpoint {
    pub const KEY_COUNT: &'static str = "Count";
    pub const KEY_MEDIAN: &'static str = "Median";

    pub fn new(count: u64, median: f64) -> Self {
        Self { count, median }
    }

    /// Encode as a state blob.  JSON numbers cannot hold NaN or infinities,
    /// so a non-finite median is written as one of the strings `"NaN"`,
    /// `"Infinity"` or `"-Infinity"`.
    pub fn to_state_map(&self) -> StateMap {
        let mut state = StateMap::new();
        state.insert(Self::KEY_COUNT.to_string(), JsonValue::from(self.count));
        state.insert(Self::KEY_MEDIAN.to_string(), encode_float(self.median));
        state
    }

    /// Decode a state blob.  Both fields must be present: `Count` as a
    /// non-negative integer and `Median` as a number or one of the
    /// non-finite spellings written by [`to_state_map`](Self::to_state_map).
    /// Other fields are ignored.
    pub fn from_state_map(state: &StateMap) -> Result<Self, MedianError> {
        let count = match state.get(Self::KEY_COUNT) {
            None => return Err(MedianError::malformed(Self::KEY_COUNT, "is missing")),
            Some(value) => value.as_u64().ok_or_else(|| {
                MedianError::malformed(
                    Self::KEY_COUNT,
                    format!("must be a non-negative integer, found {value}"),
                )
            })?,
        };

        let median = match state.get(Self::KEY_MEDIAN) {
            None => return Err(MedianError::malformed(Self::KEY_MEDIAN, "is missing")),
            Some(value) => decode_float(value).ok_or_else(|| {
                MedianError::malformed(
                    Self::KEY_MEDIAN,
                    format!("must be a number, found {value}"),
                )
            })?,
        };

        Ok(Self { count, median })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        rkyv::to_bytes::<_, 64>(self)
            .expect("Serializing a median checkpoint should work.")
            .to_vec()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MedianError> {
        // The archived root is read in place and must be suitably aligned.
        let mut aligned = rkyv::AlignedVec::with_capacity(bytes.len());
        aligned.extend_from_slice(bytes);

        let archived = rkyv::check_archived_root::<Self>(&aligned)
            .map_err(|e| MedianError::malformed("<bytes>", e.to_string()))?;
        Ok(archived
            .deserialize(&mut rkyv::Infallible)
            .unwrap_or_else(|never| match never {}))
    }
}

const NAN: &str = "NaN";
const INFINITY: &str = "Infinity";
const NEG_INFINITY: &str = "-Infinity";

fn encode_float(x: f64) -> JsonValue {
    if x.is_nan() {
        JsonValue::from(NAN)
    } else if x.is_infinite() {
        JsonValue::from(if x > 0.0 { INFINITY } else { NEG_INFINITY })
    } else {
        JsonValue::from(x)
    }
}

fn decode_float(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => match s.as_str() {
            NAN => Some(f64::NAN),
            INFINITY => Some(f64::INFINITY),
            NEG_INFINITY => Some(f64::NEG_INFINITY),
            _ => None,
        },
        _ => None,
    }
}

//! Median aggregate configuration.

use crate::{
    store::{DEFAULT_BRANCHING_FACTOR, MIN_BRANCHING_FACTOR},
    MedianError,
};
use serde::{Deserialize, Serialize};

/// Which [`OrderStatisticStore`](crate::store::OrderStatisticStore)
/// implementation backs the window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// Augmented B+ tree, O(log n) per update and per rank query.
    #[default]
    Tree,

    /// Sorted vector, O(n) per update. Kept as the reference implementation.
    Sorted,
}

/// What `remove` does with a value that is not in the window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingValuePolicy {
    /// Report [`MedianError::ValueNotPresent`].
    #[default]
    Fail,

    /// Log a warning and report the current median.
    Ignore,
}

/// Configuration shared by all aggregators created by one
/// [`MedianFactory`](crate::MedianFactory).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MedianConfig {
    pub store: StoreBackend,

    /// Maximum number of entries in a B+ tree node; ignored by the sorted
    /// backend.
    pub branching_factor: usize,

    pub missing_value: MissingValuePolicy,
}

impl Default for MedianConfig {
    fn default() -> Self {
        Self {
            store: StoreBackend::default(),
            branching_factor: DEFAULT_BRANCHING_FACTOR,
            missing_value: MissingValuePolicy::default(),
        }
    }
}

impl MedianConfig {
    /// Parse a JSON configuration, e.g. `{"store": "sorted"}`.  Missing
    /// fields take their default values.
    pub fn from_json(json: &str) -> Result<Self, MedianError> {
        let config: Self = serde_json::from_str(json).map_err(|e| MedianError::InvalidConfig {
            reason: e.to_string(),
        })?;
        Ok(config.normalized())
    }

    pub fn with_store(mut self, store: StoreBackend) -> Self {
        self.store = store;
        self
    }

    pub fn with_branching_factor(mut self, branching_factor: usize) -> Self {
        self.branching_factor = branching_factor;
        self.normalized()
    }

    pub fn with_missing_value(mut self, missing_value: MissingValuePolicy) -> Self {
        self.missing_value = missing_value;
        self
    }

    fn normalized(mut self) -> Self {
        self.branching_factor = self.branching_factor.max(MIN_BRANCHING_FACTOR);
        self
    }
}

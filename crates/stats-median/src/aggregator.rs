//! The median aggregator: a window of values of one numeric type and the
//! median reported after every change to it.

use crate::{
    algebra::MedianValue,
    checkpoint::{Checkpoint, StateMap},
    config::{MedianConfig, MissingValuePolicy},
    kind::NumericKind,
    store::{new_store, OrderStatisticStore},
    MedianError,
};
use std::fmt::{self, Debug};
use tracing::{debug, info, trace, warn};

/// Maintains the median of a multiset of `T` under insertions and removals.
///
/// The aggregator is either empty (count 0, median 0.0) or populated.  Every
/// [`add`](Self::add) and successful [`remove`](Self::remove) recomputes the
/// median from the two middle ranks of the window.
///
/// Removal is by value: with duplicates in the window, removing a value drops
/// one of its occurrences, not necessarily the one that arrived first.
///
/// The aggregator is single-writer; all methods take `&mut self` or `&self`
/// and run to completion.
pub struct MedianAggregator<T> {
    store: Box<dyn OrderStatisticStore<T>>,
    count: u64,
    median: f64,
    missing_value: MissingValuePolicy,
}

impl<T: MedianValue> Default for MedianAggregator<T> {
    fn default() -> Self {
        Self::new(&MedianConfig::default())
    }
}

impl<T: MedianValue> Debug for MedianAggregator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MedianAggregator")
            .field("kind", &T::KIND)
            .field("count", &self.count)
            .field("median", &self.median)
            .field("window", &self.store.len())
            .finish()
    }
}

impl<T: MedianValue> MedianAggregator<T> {
    pub fn new(config: &MedianConfig) -> Self {
        Self {
            store: new_store(config),
            count: 0,
            median: 0.0,
            missing_value: config.missing_value,
        }
    }

    pub fn kind(&self) -> NumericKind {
        T::KIND
    }

    /// Number of adds minus number of successful removes, starting from the
    /// last reset or restore.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// The median reported by the last mutation.
    pub fn median(&self) -> f64 {
        self.median
    }

    /// Number of values actually held in the window.  Equals
    /// [`count`](Self::count) unless the aggregator was restored from a
    /// checkpoint, which does not carry the window.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Window values in ascending order.
    pub fn values(&self) -> Vec<T> {
        self.store.to_vec()
    }

    pub fn size_bytes(&self) -> usize {
        self.store.size_bytes()
    }

    /// Add `value` to the window and return the new median.
    pub fn add(&mut self, value: T) -> f64 {
        self.store.insert(value);
        self.count += 1;
        self.median = self.compute_median();
        trace!(?value, median = self.median, "median add");
        self.median
    }

    /// Remove one occurrence of `value` from the window and return the new
    /// median, which is 0.0 once the window is empty or the count reaches 0.
    ///
    /// If `value` is not in the window the state is left unchanged and,
    /// depending on [`MissingValuePolicy`], either
    /// [`MedianError::ValueNotPresent`] or the current median is returned.
    pub fn remove(&mut self, value: T) -> Result<f64, MedianError> {
        if !self.store.remove_one(&value) {
            return match self.missing_value {
                MissingValuePolicy::Fail => {
                    debug!(?value, "rejecting removal of a value not in the median window");
                    Err(MedianError::ValueNotPresent {
                        value: format!("{value:?}"),
                    })
                }
                MissingValuePolicy::Ignore => {
                    warn!(?value, "ignoring removal of a value not in the median window");
                    Ok(self.median)
                }
            };
        }

        if self.count == 0 {
            // Only reachable after restoring a count below the window size.
            debug!(?value, window = self.store.len(), "median count already 0 on remove");
        }
        self.count = self.count.saturating_sub(1);
        self.median = if self.count == 0 {
            0.0
        } else {
            self.compute_median()
        };
        trace!(?value, median = self.median, "median remove");
        Ok(self.median)
    }

    /// Clear the window and return the median of the empty aggregator, 0.0.
    pub fn reset(&mut self) -> f64 {
        debug!(kind = %T::KIND, count = self.count, "resetting median aggregator");
        self.store.clear();
        self.count = 0;
        self.median = 0.0;
        self.median
    }

    /// True when the aggregator holds nothing worth keeping in a checkpoint:
    /// an empty window, a zero count and a zero median.
    pub fn is_quiescent(&self) -> bool {
        self.store.is_empty() && self.count == 0 && self.median == 0.0
    }

    pub fn snapshot(&self) -> Checkpoint {
        Checkpoint::new(self.count, self.median)
    }

    /// Restore count and median.  The window is not part of the checkpoint
    /// and keeps its current contents, so the restored count may differ from
    /// [`len`](Self::len).  Later medians rank over the window as stored,
    /// except that a remove bringing the count to 0 reports 0.0.
    pub fn restore(&mut self, checkpoint: &Checkpoint) {
        info!(
            kind = %T::KIND,
            count = checkpoint.count,
            median = checkpoint.median,
            "restoring median aggregator"
        );
        self.count = checkpoint.count;
        self.median = checkpoint.median;
    }

    /// Decode `state` and restore from it.  On error the aggregator is left
    /// unchanged.
    pub fn restore_state_map(&mut self, state: &StateMap) -> Result<(), MedianError> {
        let checkpoint = Checkpoint::from_state_map(state)?;
        self.restore(&checkpoint);
        Ok(())
    }

    /// Median of the window, ranking over the values actually stored.
    fn compute_median(&self) -> f64 {
        let n = self.store.len();
        let mid = n / 2;
        let Some(upper) = self.store.kth_smallest(mid) else {
            return 0.0;
        };

        if n % 2 == 1 {
            return upper.to_f64();
        }

        self.store
            .kth_smallest(mid - 1)
            .map_or(upper.to_f64(), |lower| T::sum(*upper, *lower) / 2.0)
    }
}

//! Order-statistic stores: the mutable multiset of values currently in the
//! window, answering "what is the k-th smallest value".
//!
//! Two implementations are provided.  [`OrderStatisticsMultiset`] is an
//! augmented B+ tree with O(log n) insert, remove and select.
//! [`SortedVecStore`] keeps a sorted vector and costs O(n) per update; it is
//! the reference the tree is tested against.  Both return identical results
//! for identical operation sequences.
//!
//! Removal is by value: when several equal values are stored, `remove_one`
//! drops one of them, and since equal values are indistinguishable it is not
//! observable which one.

mod order_statistics_multiset;
mod sorted_vec;

pub use order_statistics_multiset::{
    OrderStatisticsMultiset, DEFAULT_BRANCHING_FACTOR, MIN_BRANCHING_FACTOR,
};
pub use sorted_vec::SortedVecStore;

use crate::config::{MedianConfig, StoreBackend};
use size_of::SizeOf;
use std::fmt::Debug;

/// A multiset of values supporting rank queries.
pub trait OrderStatisticStore<T>: Debug + Send + Sync {
    /// Add one occurrence of `value`.
    fn insert(&mut self, value: T);

    /// Remove one occurrence of `value`.  Returns `false` and leaves the
    /// store untouched if no stored value equals `value`.
    fn remove_one(&mut self, value: &T) -> bool;

    /// Number of stored values, counting duplicates.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of distinct stored values.
    fn num_distinct(&self) -> usize;

    /// The value at 0-indexed rank `k` in ascending order, or `None` if
    /// `k >= self.len()`.
    fn kth_smallest(&self, k: usize) -> Option<&T>;

    fn clear(&mut self);

    /// All stored values in ascending order, with duplicates.
    fn to_vec(&self) -> Vec<T>;

    /// Heap memory used by the store.
    fn size_bytes(&self) -> usize;
}

/// Creates an empty store of the backend selected in `config`.
pub fn new_store<T>(config: &MedianConfig) -> Box<dyn OrderStatisticStore<T>>
where
    T: Ord + Clone + Debug + SizeOf + Send + Sync + 'static,
{
    match config.store {
        StoreBackend::Tree => Box::new(OrderStatisticsMultiset::with_branching_factor(
            config.branching_factor,
        )),
        StoreBackend::Sorted => Box::new(SortedVecStore::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::{new_store, OrderStatisticStore};
    use crate::config::{MedianConfig, StoreBackend};
    use proptest::{collection::vec, prelude::*};

    #[derive(Clone, Debug)]
    enum Op {
        Insert(i32),
        Remove(i32),
    }

    fn ops() -> impl Strategy<Value = Vec<Op>> {
        // A narrow value range produces lots of duplicates and lots of
        // removes that hit a stored value.
        vec(
            prop_oneof![
                3 => (-20..20i32).prop_map(Op::Insert),
                2 => (-20..20i32).prop_map(Op::Remove),
            ],
            0..400,
        )
    }

    fn check_against_model(store: &mut dyn OrderStatisticStore<i32>, ops: &[Op]) {
        let mut model: Vec<i32> = Vec::new();

        for op in ops {
            match op {
                Op::Insert(v) => {
                    store.insert(*v);
                    model.push(*v);
                }
                Op::Remove(v) => {
                    let expected = model.iter().position(|x| x == v);
                    if let Some(pos) = expected {
                        model.swap_remove(pos);
                    }
                    assert_eq!(store.remove_one(v), expected.is_some());
                }
            }

            model.sort();
            assert_eq!(store.len(), model.len());
            assert_eq!(store.is_empty(), model.is_empty());
            let mut distinct = model.clone();
            distinct.dedup();
            assert_eq!(store.num_distinct(), distinct.len());

            for (k, v) in model.iter().enumerate() {
                assert_eq!(store.kth_smallest(k), Some(v));
            }
            assert_eq!(store.kth_smallest(model.len()), None);
        }

        assert_eq!(store.to_vec(), model);
    }

    proptest! {
        #[test]
        fn tree_matches_model(ops in ops(), b in 4..9usize) {
            let config = MedianConfig::default().with_branching_factor(b);
            check_against_model(new_store::<i32>(&config).as_mut(), &ops);
        }

        #[test]
        fn sorted_matches_model(ops in ops()) {
            let config = MedianConfig::default().with_store(StoreBackend::Sorted);
            check_against_model(new_store::<i32>(&config).as_mut(), &ops);
        }
    }

    #[test]
    fn clear() {
        for backend in [StoreBackend::Tree, StoreBackend::Sorted] {
            let mut store = new_store::<i32>(&MedianConfig::default().with_store(backend));
            for i in 0..1000 {
                store.insert(i % 17);
            }
            assert_eq!(store.len(), 1000);
            assert_eq!(store.num_distinct(), 17);
            assert!(store.size_bytes() > 0);

            store.clear();
            assert!(store.is_empty());
            assert_eq!(store.num_distinct(), 0);
            assert_eq!(store.kth_smallest(0), None);
            assert!(!store.remove_one(&3));
        }
    }
}

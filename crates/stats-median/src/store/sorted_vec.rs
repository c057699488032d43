use size_of::SizeOf;
use std::fmt::Debug;

use super::OrderStatisticStore;

/// Reference store: all values in a vector kept in ascending order.
///
/// Insert and remove shift the tail of the vector, so both are O(n); rank
/// queries are a plain index.
#[derive(Debug, Clone, Default, SizeOf)]
pub struct SortedVecStore<T> {
    values: Vec<T>,
}

impl<T: Ord> SortedVecStore<T> {
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    pub fn as_slice(&self) -> &[T] {
        &self.values
    }
}

impl<T> OrderStatisticStore<T> for SortedVecStore<T>
where
    T: Ord + Clone + Debug + SizeOf + Send + Sync,
{
    fn insert(&mut self, value: T) {
        // Insert after any equal values.
        let pos = self.values.partition_point(|v| v <= &value);
        self.values.insert(pos, value);
    }

    fn remove_one(&mut self, value: &T) -> bool {
        match self.values.binary_search(value) {
            Ok(pos) => {
                self.values.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn num_distinct(&self) -> usize {
        self.values.chunk_by(|a, b| a == b).count()
    }

    fn kth_smallest(&self, k: usize) -> Option<&T> {
        self.values.get(k)
    }

    fn clear(&mut self) {
        self.values.clear();
    }

    fn to_vec(&self) -> Vec<T> {
        self.values.clone()
    }

    fn size_bytes(&self) -> usize {
        self.size_of().total_bytes()
    }
}

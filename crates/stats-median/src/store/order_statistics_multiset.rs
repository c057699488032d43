//! Order Statistics Multiset - an augmented B+ tree for rank/select queries.
//!
//! Every distinct value is stored once in a leaf together with its number of
//! occurrences.  Internal nodes record, for each child, the total number of
//! occurrences in that child's subtree, so selecting the k-th smallest value
//! walks a single root-to-leaf path:
//!
//! ```text
//!                    [Internal Node]
//!                    keys: [20, 40]
//!                    subtree_counts: [15, 8, 12]
//!                    children: [0, 1, 2]
//!                   /         |         \
//!          [Leaf 0]       [Leaf 1]      [Leaf 2]
//!          [(10,3),(15,5),(18,7)]  [(25,2),(30,3),(35,3)]  [(45,7),(50,5)]
//! ```
//!
//! Removing the last occurrence of a value drops its leaf entry.  Nodes are
//! never merged or freed; emptied leaves stay linked into their parents.  To
//! keep memory proportional to the live keys, the whole tree is rebuilt once
//! the arena holds four times more nodes than a freshly built tree over the
//! same keys would need.

use size_of::SizeOf;
use std::fmt::Debug;
use tracing::debug;

use super::OrderStatisticStore;

/// Default branching factor for the B+ tree.
/// Larger values are more cache friendly but may have higher constant factors.
pub const DEFAULT_BRANCHING_FACTOR: usize = 64;

/// Minimum branching factor to ensure tree properties.
pub const MIN_BRANCHING_FACTOR: usize = 4;

const NONE: usize = usize::MAX;

/// A leaf node, storing sorted (value, count) pairs.
#[derive(Debug, Clone, SizeOf)]
struct LeafNode<T> {
    entries: Vec<(T, usize)>,
    /// Index of the next leaf in the arena, or `NONE`.
    next_leaf: usize,
}

impl<T: Ord + Clone> LeafNode<T> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            next_leaf: NONE,
        }
    }

    fn total(&self) -> usize {
        self.entries.iter().map(|(_, c)| *c).sum()
    }

    fn find_key_pos(&self, key: &T) -> Result<usize, usize> {
        self.entries.binary_search_by(|(k, _)| k.cmp(key))
    }

    /// Add `count` occurrences of `key`.  Returns `true` if `key` was not
    /// present before.
    fn insert(&mut self, key: T, count: usize) -> bool {
        match self.find_key_pos(&key) {
            Ok(pos) => {
                self.entries[pos].1 += count;
                false
            }
            Err(pos) => {
                self.entries.insert(pos, (key, count));
                true
            }
        }
    }

    /// Remove one occurrence of `key`.  Returns `None` if `key` is absent,
    /// otherwise whether its entry was dropped.
    fn remove_one(&mut self, key: &T) -> Option<bool> {
        let pos = self.find_key_pos(key).ok()?;
        if self.entries[pos].1 > 1 {
            self.entries[pos].1 -= 1;
            Some(false)
        } else {
            self.entries.remove(pos);
            Some(true)
        }
    }

    fn needs_split(&self, max_entries: usize) -> bool {
        self.entries.len() > max_entries
    }

    /// Split this leaf, returning the split key and the new right leaf.  The
    /// caller links the two leaves.
    fn split(&mut self) -> (T, LeafNode<T>) {
        let mid = self.entries.len() / 2;
        let right_entries = self.entries.split_off(mid);
        let split_key = right_entries[0].0.clone();

        let right = LeafNode {
            entries: right_entries,
            next_leaf: NONE,
        };

        (split_key, right)
    }

    /// Select the k-th occurrence (0-indexed) within this leaf.
    fn select_kth(&self, mut k: usize) -> Option<&T> {
        for (key, count) in &self.entries {
            if k < *count {
                return Some(key);
            }
            k -= *count;
        }
        None
    }

    /// Number of occurrences of values strictly less than `key`.
    fn prefix_count(&self, key: &T) -> usize {
        self.entries
            .iter()
            .take_while(|(k, _)| k < key)
            .map(|(_, c)| *c)
            .sum()
    }
}

/// An internal node, storing separator keys, child indices and subtree counts.
#[derive(Debug, Clone, SizeOf)]
struct InternalNode<T> {
    /// Separator keys: every key in `children[i + 1]` is `>= keys[i]`, every
    /// key in `children[i]` is `< keys[i]`.
    keys: Vec<T>,
    /// Child node indices (into the arena).
    children: Vec<usize>,
    /// Number of occurrences in each child's subtree.
    subtree_counts: Vec<usize>,
}

impl<T: Ord + Clone> InternalNode<T> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            keys: Vec::with_capacity(capacity),
            children: Vec::with_capacity(capacity + 1),
            subtree_counts: Vec::with_capacity(capacity + 1),
        }
    }

    fn total(&self) -> usize {
        self.subtree_counts.iter().sum()
    }

    /// Position of the child whose subtree may contain `key`.
    fn find_child(&self, key: &T) -> usize {
        match self.keys.binary_search(key) {
            Ok(pos) => pos + 1,
            Err(pos) => pos,
        }
    }

    fn needs_split(&self, max_children: usize) -> bool {
        self.children.len() > max_children
    }

    /// Split this node, returning the promoted key and the new right node.
    fn split(&mut self) -> (T, InternalNode<T>) {
        let mid = self.keys.len() / 2;

        // The middle key moves up into the parent.
        let promoted_key = self.keys[mid].clone();
        let right_keys = self.keys.split_off(mid + 1);
        self.keys.pop();

        let right_children = self.children.split_off(mid + 1);
        let right_counts = self.subtree_counts.split_off(mid + 1);

        let right = InternalNode {
            keys: right_keys,
            children: right_children,
            subtree_counts: right_counts,
        };

        (promoted_key, right)
    }

    /// Child containing the k-th occurrence, and the rank within that child.
    fn find_child_for_select(&self, mut k: usize) -> Option<(usize, usize)> {
        for (i, &count) in self.subtree_counts.iter().enumerate() {
            if k < count {
                return Some((self.children[i], k));
            }
            k -= count;
        }
        None
    }
}

#[derive(Debug, Clone, SizeOf)]
enum Node<T> {
    Leaf(LeafNode<T>),
    Internal(InternalNode<T>),
}

impl<T: Ord + Clone> Node<T> {
    fn total(&self) -> usize {
        match self {
            Node::Leaf(leaf) => leaf.total(),
            Node::Internal(internal) => internal.total(),
        }
    }
}

/// An order-statistics multiset implemented as an augmented B+ tree.
///
/// # Complexity
/// - Insert: O(log n)
/// - Remove one occurrence: O(log n) amortized
/// - Select k-th, rank: O(log n)
///
/// # Example
/// ```
/// use stats_median::store::OrderStatisticsMultiset;
///
/// let mut tree = OrderStatisticsMultiset::new();
/// tree.insert_n(10, 3);
/// tree.insert_n(20, 2);
/// assert!(tree.remove_one(&10));
///
/// assert_eq!(tree.len(), 4);
/// assert_eq!(tree.select_kth(1), Some(&10));
/// assert_eq!(tree.select_kth(2), Some(&20));
/// assert_eq!(tree.rank(&20), 2);
/// ```
#[derive(Debug, Clone, SizeOf)]
pub struct OrderStatisticsMultiset<T> {
    /// Arena storage for all nodes.
    nodes: Vec<Node<T>>,
    /// Index of the root node, `NONE` if the tree is empty.
    root: usize,
    /// Index of the first leaf, for iteration.
    first_leaf: usize,
    /// Total number of occurrences.
    len: usize,
    /// Number of distinct keys.
    num_keys: usize,
    max_leaf_entries: usize,
    max_internal_children: usize,
}

impl<T: Ord + Clone> Default for OrderStatisticsMultiset<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord + Clone> OrderStatisticsMultiset<T> {
    pub fn new() -> Self {
        Self::with_branching_factor(DEFAULT_BRANCHING_FACTOR)
    }

    pub fn with_branching_factor(b: usize) -> Self {
        let b = b.max(MIN_BRANCHING_FACTOR);
        Self {
            nodes: Vec::new(),
            root: NONE,
            first_leaf: NONE,
            len: 0,
            num_keys: 0,
            max_leaf_entries: b,
            max_internal_children: b,
        }
    }

    /// Total number of occurrences.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of distinct keys.
    #[inline]
    pub fn num_keys(&self) -> usize {
        self.num_keys
    }

    pub fn branching_factor(&self) -> usize {
        self.max_leaf_entries
    }

    pub fn insert(&mut self, key: T) {
        self.insert_n(key, 1);
    }

    /// Add `count` occurrences of `key`.
    pub fn insert_n(&mut self, key: T, count: usize) {
        if count == 0 {
            return;
        }

        if self.root == NONE {
            let mut leaf = LeafNode::with_capacity(self.max_leaf_entries);
            leaf.entries.push((key, count));
            self.nodes.push(Node::Leaf(leaf));
            self.root = 0;
            self.first_leaf = 0;
            self.len = count;
            self.num_keys = 1;
            return;
        }

        let (new_key, split) = self.insert_recursive(self.root, key, count);

        self.len += count;
        if new_key {
            self.num_keys += 1;
        }

        if let Some((promoted_key, new_child_idx)) = split {
            let mut new_root = InternalNode::with_capacity(self.max_internal_children);
            new_root.keys.push(promoted_key);
            new_root.children.push(self.root);
            new_root.children.push(new_child_idx);
            new_root.subtree_counts.push(self.nodes[self.root].total());
            new_root.subtree_counts.push(self.nodes[new_child_idx].total());

            self.root = self.nodes.len();
            self.nodes.push(Node::Internal(new_root));
        }
    }

    /// Returns whether a new key was created and, if the node split, the
    /// promoted key and the index of the new right sibling.
    fn insert_recursive(
        &mut self,
        node_idx: usize,
        key: T,
        count: usize,
    ) -> (bool, Option<(T, usize)>) {
        let next_idx = self.nodes.len();
        let max_leaf_entries = self.max_leaf_entries;

        if let Node::Leaf(leaf) = &mut self.nodes[node_idx] {
            let new_key = leaf.insert(key, count);
            if !leaf.needs_split(max_leaf_entries) {
                return (new_key, None);
            }

            let (split_key, mut right) = leaf.split();
            right.next_leaf = leaf.next_leaf;
            leaf.next_leaf = next_idx;
            self.nodes.push(Node::Leaf(right));
            return (new_key, Some((split_key, next_idx)));
        }

        let (child_pos, child_idx) = {
            let internal = self.internal(node_idx);
            let child_pos = internal.find_child(&key);
            (child_pos, internal.children[child_pos])
        };

        let (new_key, split) = self.insert_recursive(child_idx, key, count);

        let Some((promoted_key, new_child_idx)) = split else {
            self.internal_mut(node_idx).subtree_counts[child_pos] += count;
            return (new_key, None);
        };

        let left_count = self.nodes[child_idx].total();
        let right_count = self.nodes[new_child_idx].total();
        let max_children = self.max_internal_children;

        let internal = self.internal_mut(node_idx);
        internal.subtree_counts[child_pos] = left_count;
        internal.keys.insert(child_pos, promoted_key);
        internal.children.insert(child_pos + 1, new_child_idx);
        internal.subtree_counts.insert(child_pos + 1, right_count);

        if !internal.needs_split(max_children) {
            return (new_key, None);
        }

        let (promoted, right) = internal.split();
        let right_idx = self.nodes.len();
        self.nodes.push(Node::Internal(right));
        (new_key, Some((promoted, right_idx)))
    }

    /// Remove one occurrence of `key`.  Returns `false` if `key` is absent.
    pub fn remove_one(&mut self, key: &T) -> bool {
        if self.root == NONE {
            return false;
        }

        let Some(dropped_key) = self.remove_recursive(self.root, key) else {
            return false;
        };

        self.len -= 1;
        if dropped_key {
            self.num_keys -= 1;
        }

        if self.len == 0 {
            self.clear();
        } else if self.has_excess_nodes() {
            self.compact();
        }
        true
    }

    /// Whether the arena has outgrown the live keys.  A rebuilt tree fills
    /// its nodes at least half way, so it needs about `num_keys / (b / 2)`
    /// leaves plus fewer internal nodes than that.
    ///
    /// Reaching the threshold again after a rebuild takes a number of
    /// splits or removals proportional to the number of keys, which keeps
    /// rebuilds amortized O(1) per operation.
    fn has_excess_nodes(&self) -> bool {
        let half = self.branching_factor() / 2;
        self.nodes.len() > 4 * (self.num_keys / half + 2)
    }

    fn remove_recursive(&mut self, node_idx: usize, key: &T) -> Option<bool> {
        let (child_pos, child_idx) = match &mut self.nodes[node_idx] {
            Node::Leaf(leaf) => return leaf.remove_one(key),
            Node::Internal(internal) => {
                let child_pos = internal.find_child(key);
                (child_pos, internal.children[child_pos])
            }
        };

        let dropped_key = self.remove_recursive(child_idx, key)?;
        self.internal_mut(node_idx).subtree_counts[child_pos] -= 1;
        Some(dropped_key)
    }

    /// The k-th smallest occurrence (0-indexed), or `None` if `k >= len`.
    ///
    /// If key A occurs 3 times and key B twice, positions 0..3 select A and
    /// positions 3..5 select B.
    pub fn select_kth(&self, k: usize) -> Option<&T> {
        if k >= self.len {
            return None;
        }

        let mut node_idx = self.root;
        let mut k = k;
        loop {
            match &self.nodes[node_idx] {
                Node::Leaf(leaf) => return leaf.select_kth(k),
                Node::Internal(internal) => {
                    (node_idx, k) = internal.find_child_for_select(k)?;
                }
            }
        }
    }

    /// Number of occurrences strictly less than `key`.
    pub fn rank(&self, key: &T) -> usize {
        if self.root == NONE {
            return 0;
        }

        let mut node_idx = self.root;
        let mut prefix = 0;
        loop {
            match &self.nodes[node_idx] {
                Node::Leaf(leaf) => return prefix + leaf.prefix_count(key),
                Node::Internal(internal) => {
                    let child_pos = internal.find_child(key);
                    prefix += internal.subtree_counts[..child_pos].iter().sum::<usize>();
                    node_idx = internal.children[child_pos];
                }
            }
        }
    }

    /// Number of occurrences of `key`.
    pub fn count(&self, key: &T) -> usize {
        if self.root == NONE {
            return 0;
        }

        let mut node_idx = self.root;
        loop {
            match &self.nodes[node_idx] {
                Node::Leaf(leaf) => {
                    return leaf.find_key_pos(key).map_or(0, |pos| leaf.entries[pos].1)
                }
                Node::Internal(internal) => {
                    node_idx = internal.children[internal.find_child(key)];
                }
            }
        }
    }

    /// Iterate over all (key, count) pairs in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (&T, usize)> {
        OrderStatisticsIter {
            tree: self,
            current_leaf: self.first_leaf,
            current_pos: 0,
        }
    }

    /// Rebuild the tree from its live entries, reclaiming empty leaves and
    /// stale separators.  O(n).
    pub fn compact(&mut self) {
        let entries: Vec<(T, usize)> = self.iter().map(|(k, c)| (k.clone(), c)).collect();
        debug!(
            nodes = self.nodes.len(),
            keys = entries.len(),
            "compacting order statistics tree"
        );

        let b = self.max_leaf_entries;
        *self = Self::with_branching_factor(b);
        for (key, count) in entries {
            self.insert_n(key, count);
        }
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = NONE;
        self.first_leaf = NONE;
        self.len = 0;
        self.num_keys = 0;
    }

    fn internal(&self, idx: usize) -> &InternalNode<T> {
        match &self.nodes[idx] {
            Node::Internal(internal) => internal,
            Node::Leaf(_) => unreachable!("expected an internal node at {idx}"),
        }
    }

    fn internal_mut(&mut self, idx: usize) -> &mut InternalNode<T> {
        match &mut self.nodes[idx] {
            Node::Internal(internal) => internal,
            Node::Leaf(_) => unreachable!("expected an internal node at {idx}"),
        }
    }
}

/// Iterator over (key, count) pairs in ascending order.
struct OrderStatisticsIter<'a, T> {
    tree: &'a OrderStatisticsMultiset<T>,
    current_leaf: usize,
    current_pos: usize,
}

impl<'a, T> Iterator for OrderStatisticsIter<'a, T> {
    type Item = (&'a T, usize);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let Node::Leaf(leaf) = self.tree.nodes.get(self.current_leaf)? else {
                return None;
            };

            if let Some((key, count)) = leaf.entries.get(self.current_pos) {
                self.current_pos += 1;
                return Some((key, *count));
            }

            self.current_leaf = leaf.next_leaf;
            self.current_pos = 0;
        }
    }
}

impl<T> OrderStatisticStore<T> for OrderStatisticsMultiset<T>
where
    T: Ord + Clone + Debug + SizeOf + Send + Sync,
{
    fn insert(&mut self, value: T) {
        OrderStatisticsMultiset::insert(self, value);
    }

    fn remove_one(&mut self, value: &T) -> bool {
        OrderStatisticsMultiset::remove_one(self, value)
    }

    fn len(&self) -> usize {
        self.len
    }

    fn num_distinct(&self) -> usize {
        self.num_keys
    }

    fn kth_smallest(&self, k: usize) -> Option<&T> {
        self.select_kth(k)
    }

    fn clear(&mut self) {
        OrderStatisticsMultiset::clear(self);
    }

    fn to_vec(&self) -> Vec<T> {
        let mut values = Vec::with_capacity(self.len);
        for (key, count) in self.iter() {
            values.extend(std::iter::repeat_n(key, count).cloned());
        }
        values
    }

    fn size_bytes(&self) -> usize {
        self.size_of().total_bytes()
    }
}

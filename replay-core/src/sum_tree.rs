//! Sum tree for prioritized sampling.
//!
//! The tree is a flat array of `2 * capacity - 1` nodes. The first
//! `capacity - 1` entries are internal nodes, the remaining `capacity` entries
//! are leaves. Leaf slot `i` lives at node `i + capacity - 1`, the parent of
//! node `k` is `(k - 1) / 2` and its children are `2k + 1` and `2k + 2`.
//! Payloads are kept in a parallel vector indexed by leaf slot.
//!
//! The cumulative order walked by [`SumTree::get`] is the in-order traversal
//! of the leaves, which matches slot order only when the capacity is a power
//! of two. Sampling is proportional either way.
use crate::error::ReplayError;
use log::trace;

/// A fixed-capacity sum tree holding one payload per leaf.
///
/// Leaves are written in circular order: once `capacity` leaves have been
/// written, [`SumTree::add`] overwrites the oldest one. Internal nodes hold the
/// sum of their children, so the root is the total priority mass.
///
/// Updates only propagate deltas. The tree is never rebuilt from its leaves,
/// so floating point drift may accumulate over very long runs.
#[derive(Debug, Clone)]
pub struct SumTree<T> {
    capacity: usize,
    tree: Vec<f32>,
    data: Vec<Option<T>>,
    write_position: usize,
    n_samples: usize,
}

impl<T> SumTree<T> {
    /// Constructs a sum tree with `capacity` leaves, all with zero priority.
    pub fn new(capacity: usize) -> Result<Self, ReplayError> {
        if capacity == 0 {
            return Err(ReplayError::ZeroCapacity);
        }

        Ok(Self {
            capacity,
            tree: vec![0f32; 2 * capacity - 1],
            data: (0..capacity).map(|_| None).collect(),
            write_position: 0,
            n_samples: 0,
        })
    }

    /// Adds `change` to every ancestor of node `ix`.
    fn propagate(&mut self, ix: usize, change: f32) {
        let mut ix = ix;
        while ix > 0 {
            ix = (ix - 1) / 2;
            self.tree[ix] += change;
        }
    }

    /// Returns the leaf node reached by the inverse-CDF walk for `s`.
    ///
    /// Ties go left. A subtree without mass is never entered while its sibling
    /// has some, which keeps unwritten leaves unreachable even if `s` slightly
    /// overshoots because of drift.
    fn retrieve(&self, s: f32) -> usize {
        let mut ix = 0;
        let mut s = s;

        loop {
            let left = 2 * ix + 1;
            let right = left + 1;

            if left >= self.tree.len() {
                return ix;
            }

            let (p_left, p_right) = (self.tree[left], self.tree[right]);
            if p_right <= 0f32 || (s <= p_left && p_left > 0f32) {
                ix = left;
            } else {
                s -= p_left;
                ix = right;
            }
        }
    }

    #[inline]
    fn leaf(&self, ix: usize) -> usize {
        ix + self.capacity - 1
    }

    fn check_priority(p: f32) -> Result<(), ReplayError> {
        if p.is_finite() && p >= 0f32 {
            Ok(())
        } else {
            Err(ReplayError::InvalidPriority(p))
        }
    }

    fn check_handle(&self, ix: usize) -> Result<(), ReplayError> {
        if ix < self.n_samples {
            Ok(())
        } else {
            Err(ReplayError::HandleOutOfRange {
                handle: ix,
                len: self.n_samples,
            })
        }
    }

    /// Writes `(p, data)` at the current write position and returns its handle.
    ///
    /// Whatever occupied the slot before is evicted.
    pub fn add(&mut self, p: f32, data: T) -> Result<usize, ReplayError> {
        Self::check_priority(p)?;

        let ix = self.write_position;
        let node = self.leaf(ix);
        let change = p - self.tree[node];
        self.tree[node] = p;
        self.propagate(node, change);
        self.data[ix] = Some(data);

        self.write_position = (self.write_position + 1) % self.capacity;
        if self.n_samples < self.capacity {
            self.n_samples += 1;
        }
        trace!("sum_tree: add ix={} p={} total={}", ix, p, self.total());

        Ok(ix)
    }

    /// Replaces the priority of the leaf `ix` and propagates the change to the root.
    pub fn update(&mut self, ix: usize, p: f32) -> Result<(), ReplayError> {
        self.check_handle(ix)?;
        Self::check_priority(p)?;

        let node = self.leaf(ix);
        let change = p - self.tree[node];
        self.tree[node] = p;
        self.propagate(node, change);

        Ok(())
    }

    /// Resolves a cumulative priority value `s` in `[0, total())` to a leaf.
    ///
    /// Returns the handle, the priority and the payload of the leaf. A negative
    /// or non-finite `s` is rejected. A value past the total, as produced by
    /// rounding, resolves to the last leaf with mass.
    pub fn get(&self, s: f32) -> Result<(usize, f32, &T), ReplayError> {
        if !(s.is_finite() && s >= 0f32) {
            return Err(ReplayError::InvalidLookup(s));
        }
        if self.n_samples == 0 {
            return Err(ReplayError::EmptyTree);
        }

        let node = self.retrieve(s);
        debug_assert!(node >= self.capacity - 1);
        let ix = node + 1 - self.capacity;
        let data = self.data[ix]
            .as_ref()
            .ok_or(ReplayError::HandleOutOfRange {
                handle: ix,
                len: self.n_samples,
            })?;

        Ok((ix, self.tree[node], data))
    }

    /// Sum of all priorities.
    #[inline]
    pub fn total(&self) -> f32 {
        self.tree[0]
    }

    /// The number of leaves that have been written, at most the capacity.
    #[inline]
    pub fn len(&self) -> usize {
        self.n_samples
    }

    /// Returns `true` if no leaf has been written yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n_samples == 0
    }

    /// The number of leaves.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The slot the next [`SumTree::add`] will write to.
    #[inline]
    pub fn write_position(&self) -> usize {
        self.write_position
    }

    /// Priority of the leaf `ix`.
    pub fn priority(&self, ix: usize) -> Result<f32, ReplayError> {
        self.check_handle(ix)?;
        Ok(self.tree[self.leaf(ix)])
    }

    /// Payload of the leaf `ix`.
    pub fn data(&self, ix: usize) -> Result<&T, ReplayError> {
        self.check_handle(ix)?;
        self.data[ix].as_ref().ok_or(ReplayError::HandleOutOfRange {
            handle: ix,
            len: self.n_samples,
        })
    }

    /// Priorities of the written leaves.
    pub fn priorities(&self) -> &[f32] {
        let start = self.capacity - 1;
        &self.tree[start..start + self.n_samples]
    }
}

//! Replay memory over a sum tree.
use super::ReplayMemoryConfig;
use crate::{error::ReplayError, SumTree};
use log::trace;
use rand::Rng;

/// A bounded replay memory sampling items in proportion to their shaped error.
///
/// The memory never inspects the stored items. Handles returned by
/// [`ReplayMemory::add`] and [`ReplayMemory::sample`] stay valid until the
/// corresponding slot is overwritten by a later `add`.
#[derive(Debug, Clone)]
pub struct ReplayMemory<T> {
    /// Priorities and items.
    sum_tree: SumTree<T>,

    /// Additive floor of the shaping function.
    floor: f32,

    /// Exponent of the shaping function.
    exponent: f32,
}

impl<T> ReplayMemory<T> {
    /// Constructs a memory with the default shaping constants.
    pub fn new(capacity: usize) -> Result<Self, ReplayError> {
        Self::build(&ReplayMemoryConfig::default().capacity(capacity))
    }

    /// Constructs a memory from a configuration.
    pub fn build(config: &ReplayMemoryConfig) -> Result<Self, ReplayError> {
        config.validate()?;

        Ok(Self {
            sum_tree: SumTree::new(config.capacity)?,
            floor: config.floor,
            exponent: config.exponent,
        })
    }

    /// Converts an error magnitude into a priority.
    ///
    /// The result is strictly positive and increases with `|error|`.
    #[inline]
    pub fn priority_of(&self, error: f32) -> f32 {
        (error.abs() + self.floor).powf(self.exponent)
    }

    /// Stores `item` with the priority derived from `error` and returns its handle.
    ///
    /// Once the memory is full, the oldest item is overwritten.
    pub fn add(&mut self, error: f32, item: T) -> Result<usize, ReplayError> {
        let p = self.priority_of(error);
        self.sum_tree.add(p, item)
    }

    /// Draws `n` handles with stratified proportional sampling.
    ///
    /// The range `[0, total)` is split into `n` segments of equal width and a
    /// value is drawn uniformly within each of them, so the returned handles
    /// are ordered by segment.
    pub fn sample_refs<R: Rng + ?Sized>(
        &self,
        n: usize,
        rng: &mut R,
    ) -> Result<Vec<(usize, &T)>, ReplayError> {
        if n == 0 {
            return Err(ReplayError::EmptyBatch);
        }
        if n > self.len() {
            return Err(ReplayError::BatchTooLarge {
                requested: n,
                stored: self.len(),
            });
        }
        let total = self.total();
        if !(total > 0f32) {
            return Err(ReplayError::EmptyTree);
        }

        let segment = total / n as f32;
        let batch = (0..n)
            .map(|i| {
                let s = segment * i as f32 + segment * rng.gen::<f32>();
                self.sum_tree.get(s).map(|(ix, _, item)| (ix, item))
            })
            .collect::<Result<Vec<_>, _>>()?;
        trace!(
            "memory: sampled {} items, total = {}, segment = {}",
            n,
            total,
            segment
        );

        Ok(batch)
    }

    /// Samples `n` `(handle, item)` pairs, cloning the items.
    ///
    /// See [`ReplayMemory::sample_refs`] for the sampling scheme.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        n: usize,
        rng: &mut R,
    ) -> Result<Vec<(usize, T)>, ReplayError>
    where
        T: Clone,
    {
        Ok(self
            .sample_refs(n, rng)?
            .into_iter()
            .map(|(ix, item)| (ix, item.clone()))
            .collect())
    }

    /// Replaces the priority of the item `ix` with the one derived from `error`.
    pub fn update(&mut self, ix: usize, error: f32) -> Result<(), ReplayError> {
        let p = self.priority_of(error);
        self.sum_tree.update(ix, p)
    }

    /// Updates the priorities of several items at once.
    ///
    /// Pairs are applied in order; the first failure stops the update.
    pub fn update_batch(&mut self, ixs: &[usize], errors: &[f32]) -> Result<(), ReplayError> {
        debug_assert_eq!(ixs.len(), errors.len());
        for (&ix, &error) in ixs.iter().zip(errors.iter()) {
            self.update(ix, error)?;
        }
        Ok(())
    }

    /// Sum of all priorities.
    #[inline]
    pub fn total(&self) -> f32 {
        self.sum_tree.total()
    }

    /// The number of stored items.
    #[inline]
    pub fn len(&self) -> usize {
        self.sum_tree.len()
    }

    /// Returns `true` if nothing has been stored yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sum_tree.is_empty()
    }

    /// Maximum number of stored items.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.sum_tree.capacity()
    }

    /// Additive floor of the shaping function.
    pub fn floor(&self) -> f32 {
        self.floor
    }

    /// Exponent of the shaping function.
    pub fn exponent(&self) -> f32 {
        self.exponent
    }

    /// The underlying sum tree.
    pub fn sum_tree(&self) -> &SumTree<T> {
        &self.sum_tree
    }
}

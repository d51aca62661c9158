//! A replay memory shared between threads.
use super::{ReplayMemory, ReplayMemoryConfig};
use crate::error::ReplayError;
use rand::Rng;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A cloneable handle to a [`ReplayMemory`] guarded by a single mutex.
///
/// Every call, including the compound [`SharedReplayMemory::sample`], holds the
/// lock for its whole duration, so an update from another thread can never
/// change the total mass in the middle of a stratified draw.
pub struct SharedReplayMemory<T> {
    inner: Arc<Mutex<ReplayMemory<T>>>,
}

impl<T> Clone for SharedReplayMemory<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> SharedReplayMemory<T> {
    /// Wraps a memory.
    pub fn new(memory: ReplayMemory<T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(memory)),
        }
    }

    /// Builds a memory from a configuration and wraps it.
    pub fn build(config: &ReplayMemoryConfig) -> Result<Self, ReplayError> {
        Ok(Self::new(ReplayMemory::build(config)?))
    }

    /// Every method leaves the tree consistent before it can panic, so a
    /// poisoned lock still guards a valid memory.
    fn lock(&self) -> MutexGuard<'_, ReplayMemory<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// See [`ReplayMemory::add`].
    pub fn add(&self, error: f32, item: T) -> Result<usize, ReplayError> {
        self.lock().add(error, item)
    }

    /// See [`ReplayMemory::sample`].
    pub fn sample<R: Rng + ?Sized>(
        &self,
        n: usize,
        rng: &mut R,
    ) -> Result<Vec<(usize, T)>, ReplayError>
    where
        T: Clone,
    {
        self.lock().sample(n, rng)
    }

    /// See [`ReplayMemory::update`].
    pub fn update(&self, ix: usize, error: f32) -> Result<(), ReplayError> {
        self.lock().update(ix, error)
    }

    /// See [`ReplayMemory::update_batch`].
    pub fn update_batch(&self, ixs: &[usize], errors: &[f32]) -> Result<(), ReplayError> {
        self.lock().update_batch(ixs, errors)
    }

    /// See [`ReplayMemory::total`].
    pub fn total(&self) -> f32 {
        self.lock().total()
    }

    /// See [`ReplayMemory::len`].
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// See [`ReplayMemory::is_empty`].
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Runs `f` with exclusive access to the memory.
    ///
    /// Use this for sequences of calls that must not interleave with other
    /// threads, e.g. a sample followed by the update of the sampled items.
    pub fn with<F, U>(&self, f: F) -> U
    where
        F: FnOnce(&mut ReplayMemory<T>) -> U,
    {
        f(&mut self.lock())
    }
}

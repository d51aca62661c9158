//! Value estimator.
use anyhow::Result;

/// A black box mapping states to per-action values.
///
/// `Clone` is used to take a frozen copy of the estimator, the target
/// estimator of DQN.
pub trait Estimator<S>: Clone {
    /// Returns the values of every action for each of `states`.
    fn predict(&self, states: &[S]) -> Result<Vec<Vec<f32>>>;

    /// Fits the estimator to `targets`, one row of action values per state,
    /// and returns the training loss.
    fn fit(&mut self, states: &[S], targets: &[Vec<f32>]) -> Result<f32>;
}

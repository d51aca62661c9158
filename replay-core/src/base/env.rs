//! Environment.
use anyhow::Result;

/// Represents an environment with a discrete action space, typically an MDP.
pub trait Env {
    /// Observation of the environment.
    type State: Clone;

    /// The number of actions. Actions are `0..n_actions()`.
    fn n_actions(&self) -> usize;

    /// Starts a new episode and returns its initial state.
    fn reset(&mut self) -> Result<Self::State>;

    /// Performs an environment step.
    ///
    /// Returns the next state, the reward and whether the episode ended.
    fn step(&mut self, act: usize) -> Result<(Self::State, f32, bool)>;
}

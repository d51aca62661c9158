//! DQN agent with prioritized replay.
//!
//! The agent keeps its transitions in a [`ReplayMemory`](crate::memory::ReplayMemory)
//! and uses the absolute TD error of each transition as the error magnitude
//! that drives the sampling priority.
mod base;
mod config;
mod explorer;
pub use base::Dqn;
pub use config::DqnConfig;
pub use explorer::{EpsilonGreedy, EpsilonGreedyConfig};

//! Prioritized experience replay in Rust.
//!
//! This crate re-exports [replay-core](replay_core), which provides
//!
//! * [`SumTree`](replay_core::SumTree), a fixed-capacity sum tree supporting
//!   proportional sampling in logarithmic time,
//! * [`ReplayMemory`](replay_core::memory::ReplayMemory) and its thread-safe
//!   wrapper [`SharedReplayMemory`](replay_core::memory::SharedReplayMemory),
//!   storing items with priorities derived from error magnitudes,
//! * a DQN agent and a trainer consuming the memory.
//!
//! The `random_walk` example trains a tabular DQN agent on a slippery chain.
pub use replay_core::*;

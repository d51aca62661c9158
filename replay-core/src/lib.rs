#![warn(missing_docs)]
//! Prioritized experience replay.
//!
//! The core of this crate is [`SumTree`], a fixed-capacity binary tree of
//! priorities supporting proportional sampling in logarithmic time, and
//! [`memory::ReplayMemory`], which converts error magnitudes into priorities
//! and draws stratified batches. The remaining modules connect the memory to
//! a DQN agent: [`dqn::Dqn`], [`Trainer`] and the collaborator traits
//! [`Env`], [`Estimator`] and [`Policy`].
pub mod dqn;
pub mod error;
pub mod memory;
pub mod record;
pub mod util;

mod base;
pub use base::{Env, Estimator, Policy, Transition};

mod sum_tree;
pub use sum_tree::SumTree;

mod trainer;
pub use trainer::{Trainer, TrainerConfig};

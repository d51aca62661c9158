//! Prioritized replay memory.
//!
//! [`ReplayMemory`] wraps a [`SumTree`](crate::SumTree) and turns error
//! magnitudes into priorities with
//!
//! $p = (|e| + \epsilon)^\alpha$,
//!
//! where $\epsilon$ is a small positive floor keeping every stored item
//! reachable and $\alpha \in (0, 1]$ controls how strongly sampling follows
//! the error ($\alpha \to 0$ is close to uniform, $\alpha = 1$ is fully
//! proportional).
//!
//! Sampling is stratified: the cumulative priority axis is split into
//! `n` segments of equal width and one value is drawn in each.
//!
//! ```rust
//! use rand::{rngs::StdRng, SeedableRng};
//! use replay_core::memory::{ReplayMemory, ReplayMemoryConfig};
//!
//! let config = ReplayMemoryConfig::default().capacity(100).exponent(0.6);
//! let mut memory = ReplayMemory::build(&config).unwrap();
//! for i in 0..10 {
//!     memory.add(i as f32 * 0.1, i).unwrap();
//! }
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let batch = memory.sample(4, &mut rng).unwrap();
//! for (ix, _item) in batch.iter() {
//!     memory.update(*ix, 0.5).unwrap();
//! }
//! ```
mod base;
mod config;
mod shared;
pub use base::ReplayMemory;
pub use config::ReplayMemoryConfig;
pub use shared::SharedReplayMemory;

//! Traits of the collaborators driving a replay memory.
//!
//! The memory itself only stores opaque items. A training loop needs two more
//! things, both external to this crate: an [`Env`] producing transitions and an
//! [`Estimator`] producing per-action values whose errors shape the
//! priorities.
mod env;
mod estimator;
mod policy;
mod transition;
pub use env::Env;
pub use estimator::Estimator;
pub use policy::Policy;
pub use transition::Transition;

//! Errors in the library.
use thiserror::Error;

/// Errors raised by the sum tree, the replay memory and records.
///
/// Every variant denotes an invalid call. Nothing in this crate retries.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReplayError {
    /// A sum tree needs at least one leaf.
    #[error("Capacity must be positive")]
    ZeroCapacity,

    /// Priorities must be finite and non-negative.
    #[error("Invalid priority: {0}")]
    InvalidPriority(f32),

    /// Shaping constants out of range.
    #[error("Invalid shaping constants: floor = {floor}, exponent = {exponent}")]
    InvalidShaping {
        /// Additive floor, must be positive.
        floor: f32,
        /// Exponent, must be in (0, 1].
        exponent: f32,
    },

    /// Lookup values must be finite and non-negative.
    #[error("Invalid lookup value: {0}")]
    InvalidLookup(f32),

    /// The tree holds no probability mass.
    #[error("Sum tree is empty")]
    EmptyTree,

    /// A batch of zero transitions was requested.
    #[error("Batch size must be positive")]
    EmptyBatch,

    /// More transitions were requested than have been stored.
    #[error("Requested {requested} transitions, but only {stored} are stored")]
    BatchTooLarge {
        /// Requested batch size.
        requested: usize,
        /// Number of stored transitions.
        stored: usize,
    },

    /// The handle does not refer to a written leaf.
    #[error("Handle {handle} is out of range (len = {len})")]
    HandleOutOfRange {
        /// The offending handle.
        handle: usize,
        /// Number of written leaves.
        len: usize,
    },

    /// The agent could never fill a batch or reach the end of its warmup.
    #[error(
        "Invalid warmup: batch size {batch_size}, warmup period {warmup_period}, capacity {capacity}"
    )]
    InvalidWarmup {
        /// Number of transitions sampled per optimization step.
        batch_size: usize,
        /// Stored transitions required before the first optimization step.
        warmup_period: usize,
        /// Capacity of the replay memory.
        capacity: usize,
    },

    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),
}

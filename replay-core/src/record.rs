//! Records of training metrics.
//!
//! A [`Record`] is a string-keyed set of values emitted by the agent at every
//! optimization step and by the trainer at the end of every episode.
//! [`Recorder`]s decide where the records go.
//!
//! ```rust
//! use replay_core::record::{Record, RecordValue};
//!
//! let mut record = Record::empty();
//! record.insert("episode", RecordValue::Scalar(3.0));
//! record.insert("score", RecordValue::Scalar(120.0));
//! assert_eq!(record.get_scalar("score").unwrap(), 120.0);
//! ```
mod base;
mod buffered_recorder;
mod null_recorder;
mod recorder;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::Recorder;

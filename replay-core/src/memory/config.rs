//! Configuration of [`ReplayMemory`](super::ReplayMemory).
use crate::error::ReplayError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    default::Default,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`ReplayMemory`](super::ReplayMemory).
///
/// # Examples
///
/// ```rust
/// use replay_core::memory::ReplayMemoryConfig;
///
/// let config = ReplayMemoryConfig::default()
///     .capacity(10_000)
///     .floor(0.01)
///     .exponent(0.6);
/// ```
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ReplayMemoryConfig {
    /// Maximum number of stored items. When the memory is full, new items
    /// replace the oldest ones.
    pub capacity: usize,

    /// Added to the error magnitude before shaping, so that no stored item
    /// ends up with zero sampling probability.
    pub floor: f32,

    /// Exponent of the shaping function. A value close to 0 results in
    /// nearly uniform sampling.
    pub exponent: f32,
}

impl Default for ReplayMemoryConfig {
    /// Creates a default configuration:
    /// - `capacity = 2000`
    /// - `floor = 0.01`
    /// - `exponent = 0.6`
    fn default() -> Self {
        Self {
            capacity: 2000,
            floor: 0.01,
            exponent: 0.6,
        }
    }
}

impl ReplayMemoryConfig {
    /// Sets the capacity of the memory.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the additive floor of the shaping function.
    pub fn floor(mut self, floor: f32) -> Self {
        self.floor = floor;
        self
    }

    /// Sets the exponent of the shaping function.
    pub fn exponent(mut self, exponent: f32) -> Self {
        self.exponent = exponent;
        self
    }

    /// Checks the values of the configuration.
    ///
    /// The capacity must be positive, the floor must be positive and the
    /// exponent must lie in `(0, 1]`.
    pub fn validate(&self) -> Result<(), ReplayError> {
        if self.capacity == 0 {
            return Err(ReplayError::ZeroCapacity);
        }
        let floor_ok = self.floor.is_finite() && self.floor > 0.0;
        let exponent_ok = self.exponent > 0.0 && self.exponent <= 1.0;
        if floor_ok && exponent_ok {
            Ok(())
        } else {
            Err(ReplayError::InvalidShaping {
                floor: self.floor,
                exponent: self.exponent,
            })
        }
    }

    /// Loads the configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves the configuration to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

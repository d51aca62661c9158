//! Configuration of DQN agent.
use super::EpsilonGreedyConfig;
use crate::{error::ReplayError, memory::ReplayMemoryConfig};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    default::Default,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Constructs [`Dqn`](super::Dqn).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct DqnConfig {
    /// Configuration of the replay memory.
    pub memory: ReplayMemoryConfig,

    /// Number of transitions sampled at every optimization step.
    pub batch_size: usize,

    /// Discount factor of future rewards.
    pub discount_factor: f32,

    /// Minimum number of stored transitions before optimization starts.
    pub warmup_period: usize,

    /// Seed of the random number generator used for exploration and sampling.
    pub seed: u64,

    /// Configuration of the epsilon-greedy explorer.
    pub explorer: EpsilonGreedyConfig,
}

impl Default for DqnConfig {
    fn default() -> Self {
        Self {
            memory: ReplayMemoryConfig::default(),
            batch_size: 64,
            discount_factor: 0.99,
            warmup_period: 2000,
            seed: 42,
            explorer: EpsilonGreedyConfig::default(),
        }
    }
}

impl DqnConfig {
    /// Sets the configuration of the replay memory.
    pub fn memory(mut self, v: ReplayMemoryConfig) -> Self {
        self.memory = v;
        self
    }

    /// Sets the batch size.
    pub fn batch_size(mut self, v: usize) -> Self {
        self.batch_size = v;
        self
    }

    /// Sets the discount factor.
    pub fn discount_factor(mut self, v: f32) -> Self {
        self.discount_factor = v;
        self
    }

    /// Sets the warmup period in stored transitions.
    pub fn warmup_period(mut self, v: usize) -> Self {
        self.warmup_period = v;
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Sets the explorer.
    pub fn explorer(mut self, v: EpsilonGreedyConfig) -> Self {
        self.explorer = v;
        self
    }

    /// Checks that optimization can start.
    ///
    /// Requires `0 < batch_size <= warmup_period <= memory.capacity`: the
    /// memory never holds more than `capacity` transitions, and the first
    /// batch is drawn as soon as the warmup ends.
    pub fn validate(&self) -> Result<(), ReplayError> {
        self.memory.validate()?;
        let capacity = self.memory.capacity;
        if self.batch_size == 0
            || self.batch_size > self.warmup_period
            || self.warmup_period > capacity
        {
            return Err(ReplayError::InvalidWarmup {
                batch_size: self.batch_size,
                warmup_period: self.warmup_period,
                capacity,
            });
        }
        Ok(())
    }

    /// Loads [`DqnConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`DqnConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_dqn_config() -> Result<()> {
        let config = DqnConfig::default()
            .memory(ReplayMemoryConfig::default().capacity(300))
            .batch_size(16)
            .discount_factor(0.9)
            .warmup_period(100)
            .seed(7)
            .explorer(EpsilonGreedyConfig::default().eps_decay(0.99));

        let dir = TempDir::new("dqn_config")?;
        let path = dir.path().join("dqn_config.yaml");
        config.save(&path)?;
        let config_ = DqnConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }

    #[test]
    fn test_validate() {
        let memory = ReplayMemoryConfig::default().capacity(8);
        let config = DqnConfig::default().memory(memory);
        assert!(config.clone().batch_size(4).warmup_period(8).validate().is_ok());
        assert!(config.clone().batch_size(4).warmup_period(4).validate().is_ok());
        assert_eq!(
            config.clone().batch_size(4).warmup_period(16).validate(),
            Err(ReplayError::InvalidWarmup {
                batch_size: 4,
                warmup_period: 16,
                capacity: 8
            })
        );
        assert!(config.clone().batch_size(8).warmup_period(4).validate().is_err());
        assert!(config.clone().batch_size(0).warmup_period(4).validate().is_err());
        assert_eq!(
            DqnConfig::default()
                .memory(ReplayMemoryConfig::default().capacity(0))
                .validate(),
            Err(ReplayError::ZeroCapacity)
        );
        assert!(DqnConfig::default().validate().is_ok());
    }
}

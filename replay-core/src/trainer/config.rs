//! Configuration of [`Trainer`](super::Trainer).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Trainer`](super::Trainer).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TrainerConfig {
    /// The maximum number of episodes.
    pub max_episodes: usize,

    /// Warmup period, for filling the replay memory, in environment steps.
    pub warmup_period: usize,

    /// Reward that replaces the one of a terminal step ending an episode
    /// before `max_score` is reached.
    pub failure_reward: Option<f32>,

    /// Score of an episode that ran to its time limit.
    pub max_score: f32,

    /// The number of recent episodes averaged for the stopping criterion.
    pub score_window: usize,

    /// Training stops when the mean score of the last `score_window` episodes
    /// exceeds this value.
    pub target_score: Option<f32>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            max_episodes: 300,
            warmup_period: 2000,
            failure_reward: None,
            max_score: 500.0,
            score_window: 10,
            target_score: None,
        }
    }
}

impl TrainerConfig {
    /// Sets the number of episodes.
    pub fn max_episodes(mut self, v: usize) -> Self {
        self.max_episodes = v;
        self
    }

    /// Sets the warmup period in environment steps.
    pub fn warmup_period(mut self, v: usize) -> Self {
        self.warmup_period = v;
        self
    }

    /// Sets the reward given on failure.
    pub fn failure_reward(mut self, v: f32) -> Self {
        self.failure_reward = Some(v);
        self
    }

    /// Sets the score of a successful episode.
    pub fn max_score(mut self, v: f32) -> Self {
        self.max_score = v;
        self
    }

    /// Sets the window of the stopping criterion.
    pub fn score_window(mut self, v: usize) -> Self {
        self.score_window = v;
        self
    }

    /// Sets the score at which training stops.
    pub fn target_score(mut self, v: f32) -> Self {
        self.target_score = Some(v);
        self
    }

    /// Constructs [`TrainerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path_ = path.as_ref().to_owned();
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        log::info!("Load config of trainer from {}", path_.to_str().unwrap_or("?"));
        Ok(b)
    }

    /// Saves [`TrainerConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path_ = path.as_ref().to_owned();
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        log::info!("Save config of trainer into {}", path_.to_str().unwrap_or("?"));
        Ok(())
    }
}

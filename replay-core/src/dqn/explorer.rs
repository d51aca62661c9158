//! Exploration strategy of DQN.
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Configuration of [`EpsilonGreedy`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct EpsilonGreedyConfig {
    /// Initial value of epsilon.
    pub eps_start: f32,

    /// Multiplicative decay applied at every optimization step.
    pub eps_decay: f32,

    /// Epsilon is not decayed once it is at or below this value.
    pub eps_min: f32,
}

impl Default for EpsilonGreedyConfig {
    fn default() -> Self {
        Self {
            eps_start: 1.0,
            eps_decay: 0.999,
            eps_min: 0.01,
        }
    }
}

impl EpsilonGreedyConfig {
    /// Sets the initial value of epsilon.
    pub fn eps_start(mut self, v: f32) -> Self {
        self.eps_start = v;
        self
    }

    /// Sets the decay factor.
    pub fn eps_decay(mut self, v: f32) -> Self {
        self.eps_decay = v;
        self
    }

    /// Sets the lower bound of the decay.
    pub fn eps_min(mut self, v: f32) -> Self {
        self.eps_min = v;
        self
    }
}

/// Epsilon-greedy explorer for DQN.
#[derive(Debug, Clone, PartialEq)]
pub struct EpsilonGreedy {
    config: EpsilonGreedyConfig,
    eps: f32,
}

impl EpsilonGreedy {
    /// Constructs epsilon-greedy explorer.
    pub fn build(config: &EpsilonGreedyConfig) -> Self {
        Self {
            config: config.clone(),
            eps: config.eps_start,
        }
    }

    /// Current value of epsilon.
    pub fn eps(&self) -> f32 {
        self.eps
    }

    /// Returns `true` until the first decay.
    pub fn is_initial(&self) -> bool {
        self.eps >= self.config.eps_start
    }

    /// Decays epsilon by one step.
    pub fn decay(&mut self) {
        if self.eps > self.config.eps_min {
            self.eps *= self.config.eps_decay;
        }
    }

    /// Takes an action based on the action values.
    ///
    /// With probability epsilon a uniformly random action is returned,
    /// otherwise the greedy one.
    pub fn action<R: Rng + ?Sized>(&self, values: &[f32], rng: &mut R) -> usize {
        if !values.is_empty() && rng.gen::<f32>() < self.eps {
            rng.gen_range(0..values.len())
        } else {
            argmax(values)
        }
    }
}

/// Index of the largest value, the first one on ties.
pub(super) fn argmax(values: &[f32]) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |(ix_max, v_max), (ix, &v)| {
            if v > v_max {
                (ix, v)
            } else {
                (ix_max, v_max)
            }
        })
        .0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_decay_stops_at_min() {
        let config = EpsilonGreedyConfig::default()
            .eps_start(1.0)
            .eps_decay(0.5)
            .eps_min(0.2);
        let mut explorer = EpsilonGreedy::build(&config);
        assert!(explorer.is_initial());

        explorer.decay();
        assert!(!explorer.is_initial());
        assert_eq!(explorer.eps(), 0.5);
        explorer.decay();
        explorer.decay();
        assert_eq!(explorer.eps(), 0.125);
        explorer.decay();
        assert_eq!(explorer.eps(), 0.125);
    }

    #[test]
    fn test_greedy_and_random() {
        let mut rng = StdRng::seed_from_u64(42);
        let values = [0.1, 0.7, 0.7, -1.0];
        assert_eq!(argmax(&values), 1);

        let greedy = EpsilonGreedy::build(&EpsilonGreedyConfig::default().eps_start(0.0));
        for _ in 0..100 {
            assert_eq!(greedy.action(&values, &mut rng), 1);
        }

        let random = EpsilonGreedy::build(&EpsilonGreedyConfig::default().eps_start(1.0));
        let mut counts = [0usize; 4];
        for _ in 0..4000 {
            counts[random.action(&values, &mut rng)] += 1;
        }
        assert!(counts.iter().all(|&c| c > 800));
    }
}

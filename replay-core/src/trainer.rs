//! Train [`Dqn`] with prioritized replay.
mod config;
use crate::{
    dqn::Dqn,
    record::{Record, RecordValue::Scalar, Recorder},
    Env, Estimator, Transition,
};
use anyhow::Result;
pub use config::TrainerConfig;
use log::info;
use std::collections::VecDeque;

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Manages the episode loop of a [`Dqn`] agent.
///
/// # Training loop
///
/// 0. Given an agent, an environment and a recorder implementing [`Recorder`].
/// 1. Reset the environment, `score = 0`.
/// 2. Take an action, do an environment step, `env_steps += 1`.
/// 3. If the step ended the episode before `max_score` was reached and
///    `failure_reward` is given, the reward of the stored transition is
///    replaced by `failure_reward`. The score always accumulates the
///    reward returned by the environment.
/// 4. Push the transition to the agent, which stores it in its replay memory
///    with its TD error.
/// 5. If `env_steps >= warmup_period`, do an optimization step.
/// 6. If the episode has not ended, back to step 2. Otherwise update the
///    target estimator and write a record with `episode`, `score`,
///    `memory_len` and `epsilon`, merged with the last optimization record.
/// 7. Stop after `max_episodes` episodes, or when the mean score of the last
///    `score_window` episodes (all of them while fewer have been run) exceeds
///    `target_score`. Otherwise back to step 1.
///
/// # Interaction of objects
///
/// ```mermaid
/// graph LR
///     A[Dqn]-->|action|B[Env]
///     B -->|state, reward|A
///     A -->|"Transition, TD error"|C[ReplayMemory]
///     C -->|stratified batch|A
///     A -->|new TD errors|C
/// ```
pub struct Trainer {
    /// The maximum number of episodes.
    max_episodes: usize,

    /// Warmup period in environment steps.
    warmup_period: usize,

    failure_reward: Option<f32>,
    max_score: f32,
    score_window: usize,
    target_score: Option<f32>,

    /// Environment steps since the trainer was built.
    env_steps: usize,

    /// Scores of the most recent episodes.
    recent_scores: VecDeque<f32>,
}

impl Trainer {
    /// Constructs a trainer.
    pub fn build(config: TrainerConfig) -> Self {
        Self {
            max_episodes: config.max_episodes,
            warmup_period: config.warmup_period,
            failure_reward: config.failure_reward,
            max_score: config.max_score,
            score_window: config.score_window.max(1),
            target_score: config.target_score,
            env_steps: 0,
            recent_scores: VecDeque::new(),
        }
    }

    /// The number of environment steps done so far.
    pub fn env_steps(&self) -> usize {
        self.env_steps
    }

    /// Runs a single episode and returns its score with the last record of
    /// optimization, if any.
    pub fn train_episode<E, Q>(
        &mut self,
        env: &mut E,
        agent: &mut Dqn<Q, E::State>,
    ) -> Result<(f32, Option<Record>)>
    where
        E: Env,
        Q: Estimator<E::State>,
    {
        let mut state = env.reset()?;
        let mut score = 0f32;
        let mut record = None;

        loop {
            let act = agent.action(&state)?;
            let (next_state, reward, is_done) = env.step(act)?;
            self.env_steps += 1;

            let r = match self.failure_reward {
                Some(r) if is_done && score + reward < self.max_score => r,
                _ => reward,
            };
            agent.push(Transition::new(
                state,
                act,
                r,
                next_state.clone(),
                is_done,
            ))?;

            if self.env_steps >= self.warmup_period {
                if let Some(r) = agent.opt()? {
                    record = Some(r);
                }
            }

            score += reward;
            state = next_state;

            if is_done {
                return Ok((score, record));
            }
        }
    }

    /// Mean of the scores of the last `score_window` episodes, or of every
    /// episode while fewer have been run.
    fn mean_recent_score(&self) -> Option<f32> {
        match self.recent_scores.len() {
            0 => None,
            n => Some(self.recent_scores.iter().sum::<f32>() / n as f32),
        }
    }

    /// Train the agent and returns the score of every episode.
    pub fn train<E, Q, R>(
        &mut self,
        env: &mut E,
        agent: &mut Dqn<Q, E::State>,
        recorder: &mut R,
    ) -> Result<Vec<f32>>
    where
        E: Env,
        Q: Estimator<E::State>,
        R: Recorder,
    {
        let mut scores = Vec::new();
        agent.train();
        info!(
            "Start training for {} episodes, warmup period = {}",
            self.max_episodes, self.warmup_period
        );

        for episode in 0..self.max_episodes {
            let (score, opt_record) = self.train_episode(env, agent)?;
            agent.update_target();
            scores.push(score);

            self.recent_scores.push_back(score);
            if self.recent_scores.len() > self.score_window {
                self.recent_scores.pop_front();
            }

            info!(
                "episode: {}, score: {}, memory length: {}, epsilon: {}",
                episode,
                score,
                agent.memory().len(),
                agent.epsilon()
            );
            let record = Record::from_slice(&[
                ("episode", Scalar(episode as _)),
                ("score", Scalar(score)),
                ("memory_len", Scalar(agent.memory().len() as _)),
                ("epsilon", Scalar(agent.epsilon())),
            ]);
            recorder.write(match opt_record {
                Some(r) => r.merge(record),
                None => record,
            });

            if let (Some(target), Some(mean)) = (self.target_score, self.mean_recent_score()) {
                if mean > target {
                    info!(
                        "Mean score {} of the last {} episodes exceeds {}, stop training",
                        mean,
                        self.recent_scores.len(),
                        target
                    );
                    break;
                }
            }
        }

        info!("Finished training after {} environment steps", self.env_steps);
        Ok(scores)
    }
}

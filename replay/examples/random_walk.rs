use anyhow::Result;
use clap::Parser;
use log::info;
use rand::{rngs::StdRng, Rng, SeedableRng};
use replay::{
    dqn::{Dqn, DqnConfig, EpsilonGreedyConfig},
    memory::ReplayMemoryConfig,
    record::BufferedRecorder,
    util::eval_with_recorder,
    Env, Estimator, Trainer, TrainerConfig,
};
use serde::Serialize;

const N_STATES: usize = 11;
const MAX_STEPS: usize = 100;
const SLIP_PROB: f32 = 0.1;
const LR: f32 = 0.2;
const DISCOUNT_FACTOR: f32 = 0.95;
const BATCH_SIZE: usize = 32;
const WARMUP_PERIOD: usize = 200;
const MEMORY_CAPACITY: usize = 2000;
const MAX_EPISODES: usize = 300;
const SCORE_WINDOW: usize = 10;
const TARGET_SCORE: f32 = 0.95;
const FAILURE_REWARD: f32 = -1.0;
const N_EPISODES_PER_EVAL: usize = 5;

/// A chain of states starting in the middle. The agent moves left or right
/// and slips to the other direction with a small probability. The right end
/// gives reward 1 and the left end ends the episode without reward.
struct RandomWalk {
    state: usize,
    steps: usize,
    rng: StdRng,
}

impl RandomWalk {
    fn new(seed: u64) -> Self {
        Self {
            state: N_STATES / 2,
            steps: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Env for RandomWalk {
    type State = usize;

    fn n_actions(&self) -> usize {
        2
    }

    fn reset(&mut self) -> Result<usize> {
        self.state = N_STATES / 2;
        self.steps = 0;
        Ok(self.state)
    }

    fn step(&mut self, act: usize) -> Result<(usize, f32, bool)> {
        let right = (act == 1) != (self.rng.gen::<f32>() < SLIP_PROB);
        self.state = if right { self.state + 1 } else { self.state - 1 };
        self.steps += 1;

        match self.state {
            s if s == N_STATES - 1 => Ok((s, 1.0, true)),
            0 => Ok((0, 0.0, true)),
            s => Ok((s, 0.0, self.steps >= MAX_STEPS)),
        }
    }
}

/// Action values of every state, moved toward the targets by `lr`.
#[derive(Clone)]
struct Tabular {
    values: Vec<Vec<f32>>,
    lr: f32,
}

impl Estimator<usize> for Tabular {
    fn predict(&self, states: &[usize]) -> Result<Vec<Vec<f32>>> {
        Ok(states.iter().map(|&s| self.values[s].clone()).collect())
    }

    fn fit(&mut self, states: &[usize], targets: &[Vec<f32>]) -> Result<f32> {
        let mut loss = 0f32;
        for (&s, target) in states.iter().zip(targets.iter()) {
            for (v, &t) in self.values[s].iter_mut().zip(target.iter()) {
                loss += (t - *v).powi(2);
                *v += self.lr * (t - *v);
            }
        }
        Ok(loss / states.len() as f32)
    }
}

#[derive(Serialize)]
struct RandomWalkConfig {
    agent_config: DqnConfig,
    trainer_config: TrainerConfig,
}

impl RandomWalkConfig {
    fn new(args: &Args) -> Self {
        let memory_config = ReplayMemoryConfig::default()
            .capacity(MEMORY_CAPACITY)
            .exponent(args.exponent);
        let agent_config = DqnConfig::default()
            .memory(memory_config)
            .batch_size(BATCH_SIZE)
            .discount_factor(DISCOUNT_FACTOR)
            .warmup_period(BATCH_SIZE)
            .seed(args.seed)
            .explorer(EpsilonGreedyConfig::default().eps_decay(0.995));
        let trainer_config = TrainerConfig::default()
            .max_episodes(args.max_episodes)
            .warmup_period(WARMUP_PERIOD)
            .failure_reward(FAILURE_REWARD)
            .max_score(1.0)
            .score_window(SCORE_WINDOW)
            .target_score(TARGET_SCORE);
        Self {
            agent_config,
            trainer_config,
        }
    }
}

/// Train a tabular DQN agent with prioritized replay on a random walk
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Maximum number of training episodes
    #[arg(long, default_value_t = MAX_EPISODES)]
    max_episodes: usize,

    /// Exponent of the priority shaping function
    #[arg(long, default_value_t = 0.6)]
    exponent: f32,

    /// Random seed of the agent and the environment
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Save the configuration of the agent to this YAML file
    #[arg(long)]
    save_config: Option<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = RandomWalkConfig::new(&args);
    info!("Configuration:\n{}", serde_yaml::to_string(&config)?);
    if let Some(path) = &args.save_config {
        config.agent_config.save(path)?;
    }

    let mut env = RandomWalk::new(args.seed);
    let qnet = Tabular {
        values: vec![vec![0.0; env.n_actions()]; N_STATES],
        lr: LR,
    };
    let mut agent = Dqn::build(&config.agent_config, qnet)?;
    let mut trainer = Trainer::build(config.trainer_config);
    let mut recorder = BufferedRecorder::new();

    let scores = trainer.train(&mut env, &mut agent, &mut recorder)?;
    info!(
        "Trained for {} episodes, {} optimization steps, priority total = {}",
        scores.len(),
        agent.n_opts(),
        agent.memory().total()
    );

    agent.eval();
    let mut recorder = BufferedRecorder::new();
    let returns = eval_with_recorder(&mut env, &mut agent, N_EPISODES_PER_EVAL, &mut recorder)?;
    info!(
        "Evaluation: returns = {:?}, {} steps",
        returns,
        recorder.len()
    );

    Ok(())
}

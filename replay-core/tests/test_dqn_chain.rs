use anyhow::Result;
use replay_core::{
    dqn::{Dqn, DqnConfig, EpsilonGreedyConfig},
    memory::ReplayMemoryConfig,
    record::{BufferedRecorder, NullRecorder},
    util::eval_with_recorder,
    Env, Estimator, Trainer, TrainerConfig,
};

const N_STATES: usize = 5;
const MAX_STEPS: usize = 20;

/// A chain of states. Action 1 moves right, action 0 moves left, and
/// reaching the right end gives reward 1 and ends the episode.
struct Chain {
    n_states: usize,
    max_steps: usize,
    state: usize,
    steps: usize,
}

impl Chain {
    fn new(n_states: usize, max_steps: usize) -> Self {
        Self {
            n_states,
            max_steps,
            state: 0,
            steps: 0,
        }
    }
}

impl Env for Chain {
    type State = usize;

    fn n_actions(&self) -> usize {
        2
    }

    fn reset(&mut self) -> Result<usize> {
        self.state = 0;
        self.steps = 0;
        Ok(self.state)
    }

    fn step(&mut self, act: usize) -> Result<(usize, f32, bool)> {
        self.steps += 1;
        self.state = match act {
            0 => self.state.saturating_sub(1),
            _ => self.state + 1,
        };
        if self.state == self.n_states - 1 {
            Ok((self.state, 1.0, true))
        } else {
            Ok((self.state, 0.0, self.steps >= self.max_steps))
        }
    }
}

#[derive(Clone)]
struct Table {
    values: Vec<Vec<f32>>,
    lr: f32,
}

impl Table {
    fn new(n_states: usize, n_actions: usize, lr: f32) -> Self {
        Self {
            values: vec![vec![0.0; n_actions]; n_states],
            lr,
        }
    }
}

impl Estimator<usize> for Table {
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

fn dqn_config() -> DqnConfig {
    DqnConfig::default()
        .memory(ReplayMemoryConfig::default().capacity(256))
        .batch_size(8)
        .warmup_period(16)
        .discount_factor(0.9)
        .seed(13)
        .explorer(EpsilonGreedyConfig::default().eps_decay(0.99))
}

#[test]
fn test_train_chain() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut env = Chain::new(N_STATES, MAX_STEPS);
    let mut agent = Dqn::build(&dqn_config(), Table::new(N_STATES, 2, 0.5))?;
    let mut trainer = Trainer::build(
        TrainerConfig::default()
            .max_episodes(200)
            .warmup_period(16)
            .max_score(1.0),
    );
    let mut recorder = BufferedRecorder::new();

    let scores = trainer.train(&mut env, &mut agent, &mut recorder)?;
    assert_eq!(scores.len(), 200);
    assert_eq!(recorder.len(), 200);
    assert_eq!(recorder.scalars("score"), scores);
    assert!(agent.n_opts() > 0);
    assert!(agent.epsilon() < 0.05);

    let memory_len = recorder.scalars("memory_len");
    assert!(memory_len.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(*memory_len.last().unwrap(), agent.memory().len() as f32);

    // The greedy policy walks straight to the right end.
    agent.eval();
    let mut recorder = BufferedRecorder::new();
    let returns = eval_with_recorder(&mut env, &mut agent, 3, &mut recorder)?;
    assert_eq!(returns, vec![1.0, 1.0, 1.0]);
    assert_eq!(recorder.len(), 3 * (N_STATES - 1));
    Ok(())
}

#[test]
fn test_train_stops_at_target_score() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut env = Chain::new(N_STATES, MAX_STEPS);
    let mut agent = Dqn::build(&dqn_config(), Table::new(N_STATES, 2, 0.5))?;
    let mut trainer = Trainer::build(
        TrainerConfig::default()
            .max_episodes(500)
            .warmup_period(16)
            .max_score(1.0)
            .score_window(5)
            .target_score(0.9),
    );

    let scores = trainer.train(&mut env, &mut agent, &mut NullRecorder::new())?;
    assert!(scores.len() < 500);
    // Scores are 0 or 1, so a mean above 0.9 over at most 5 episodes means
    // every one of them reached the goal.
    let window = scores.len().min(5);
    assert!(scores[scores.len() - window..].iter().all(|&s| s == 1.0));
    Ok(())
}

#[test]
fn test_failure_reward_on_time_limit() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();

    // The goal cannot be reached within the time limit.
    let mut env = Chain::new(100, 3);
    let mut agent = Dqn::build(&dqn_config(), Table::new(100, 2, 0.5))?;
    let mut trainer = Trainer::build(
        TrainerConfig::default()
            .max_episodes(1)
            .warmup_period(1000)
            .failure_reward(-1.0)
            .max_score(1.0),
    );

    let scores = trainer.train(&mut env, &mut agent, &mut NullRecorder::new())?;
    assert_eq!(scores, vec![0.0]);
    assert_eq!(trainer.env_steps(), 3);
    assert_eq!(agent.n_opts(), 0);

    let tree = agent.memory().sum_tree();
    assert_eq!(tree.len(), 3);
    assert_eq!(tree.data(0)?.reward, 0.0);
    assert_eq!(tree.data(1)?.reward, 0.0);
    // No optimization step has happened, so every transition is stored as
    // terminal.
    assert!(tree.data(0)?.is_done);
    assert!(tree.data(1)?.is_done);
    let last = tree.data(2)?;
    assert!(last.is_done);
    assert_eq!(last.reward, -1.0);
    // Before any optimization the priority is |0 - (-1)| shaped.
    let expected = (1.0f32 + 0.01).powf(0.6);
    assert!((tree.priority(2)? - expected).abs() < 1e-6);
    Ok(())
}

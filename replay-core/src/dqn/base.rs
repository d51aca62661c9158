//! DQN agent.
use super::{explorer::argmax, DqnConfig, EpsilonGreedy};
use crate::{
    memory::ReplayMemory,
    record::{Record, RecordValue},
    Env, Estimator, Policy, Transition,
};
use anyhow::Result;
use log::debug;
use rand::{rngs::StdRng, SeedableRng};
use std::slice;

#[allow(clippy::upper_case_acronyms)]
/// DQN agent with prioritized replay.
///
/// `Q` is the action-value estimator and `S` the state type of the
/// environment.
pub struct Dqn<Q, S> {
    qnet: Q,
    qnet_tgt: Q,
    memory: ReplayMemory<Transition<S>>,
    explorer: EpsilonGreedy,
    rng: StdRng,
    batch_size: usize,
    discount_factor: f32,
    warmup_period: usize,
    train: bool,
    n_opts: usize,
}

impl<Q, S> Dqn<Q, S>
where
    Q: Estimator<S>,
    S: Clone,
{
    /// Constructs DQN agent.
    ///
    /// The target estimator starts as a clone of `qnet`. Fails if the
    /// configuration does not pass [`DqnConfig::validate`].
    pub fn build(config: &DqnConfig, qnet: Q) -> Result<Self> {
        config.validate()?;
        let memory = ReplayMemory::build(&config.memory)?;
        let qnet_tgt = qnet.clone();

        Ok(Self {
            qnet,
            qnet_tgt,
            memory,
            explorer: EpsilonGreedy::build(&config.explorer),
            rng: StdRng::seed_from_u64(config.seed),
            batch_size: config.batch_size,
            discount_factor: config.discount_factor,
            warmup_period: config.warmup_period,
            train: true,
            n_opts: 0,
        })
    }

    /// Set the agent to training mode.
    pub fn train(&mut self) {
        self.train = true;
    }

    /// Set the agent to evaluation mode, where actions are greedy.
    pub fn eval(&mut self) {
        self.train = false;
    }

    /// Returns `true` in training mode.
    pub fn is_train(&self) -> bool {
        self.train
    }

    /// Current value of epsilon.
    pub fn epsilon(&self) -> f32 {
        self.explorer.eps()
    }

    /// The number of optimization steps done so far.
    pub fn n_opts(&self) -> usize {
        self.n_opts
    }

    /// The replay memory of the agent.
    pub fn memory(&self) -> &ReplayMemory<Transition<S>> {
        &self.memory
    }

    /// The online estimator.
    pub fn qnet(&self) -> &Q {
        &self.qnet
    }

    /// Takes an action in the given state.
    pub fn action(&mut self, state: &S) -> Result<usize> {
        let values = self
            .qnet
            .predict(slice::from_ref(state))?
            .pop()
            .unwrap_or_default();
        let act = if self.train {
            self.explorer.action(&values, &mut self.rng)
        } else {
            argmax(&values)
        };
        Ok(act)
    }

    /// Computes bootstrapped targets and absolute TD errors of transitions.
    ///
    /// The returned targets are the predicted action values of the online
    /// estimator with the entry of the taken action replaced by its target.
    fn td_targets<'a, I>(&self, transitions: I) -> Result<(Vec<S>, Vec<Vec<f32>>, Vec<f32>)>
    where
        I: IntoIterator<Item = (&'a Transition<S>, bool)>,
        S: 'a,
    {
        let (transitions, is_done): (Vec<_>, Vec<_>) = transitions.into_iter().unzip();
        let states = transitions
            .iter()
            .map(|t| t.state.clone())
            .collect::<Vec<_>>();
        let next_states = transitions
            .iter()
            .map(|t| t.next_state.clone())
            .collect::<Vec<_>>();

        let mut targets = self.qnet.predict(&states)?;
        let q_next = self.qnet_tgt.predict(&next_states)?;
        let mut errors = Vec::with_capacity(transitions.len());

        for (i, t) in transitions.iter().enumerate() {
            let tgt = if is_done[i] {
                t.reward
            } else {
                let max_next = q_next[i].iter().cloned().fold(f32::NEG_INFINITY, f32::max);
                t.reward + self.discount_factor * max_next
            };
            let pred = targets[i][t.act];
            errors.push((pred - tgt).abs());
            targets[i][t.act] = tgt;
        }

        Ok((states, targets, errors))
    }

    /// Stores a transition with its TD error as the error magnitude.
    ///
    /// Before the first optimization step the transition is stored as
    /// terminal, so neither its initial error nor its later targets bootstrap
    /// from the untrained target estimator.
    pub fn push(&mut self, mut transition: Transition<S>) -> Result<usize> {
        if self.explorer.is_initial() {
            transition.is_done = true;
        }
        let (_, _, errors) = self.td_targets([(&transition, transition.is_done)])?;
        let ix = self.memory.add(errors[0], transition)?;
        Ok(ix)
    }

    /// Performs an optimization step.
    ///
    /// Returns `None` while the memory holds fewer than `warmup_period`
    /// transitions. [`DqnConfig::validate`] guarantees the memory can hold
    /// them and that a full batch is available afterwards.
    pub fn opt(&mut self) -> Result<Option<Record>> {
        if self.memory.len() < self.warmup_period {
            return Ok(None);
        }

        self.explorer.decay();

        let batch = self.memory.sample_refs(self.batch_size, &mut self.rng)?;
        let ixs = batch.iter().map(|(ix, _)| *ix).collect::<Vec<_>>();
        let (states, targets, errors) =
            self.td_targets(batch.into_iter().map(|(_, t)| (t, t.is_done)))?;

        self.memory.update_batch(&ixs, &errors)?;
        let loss = self.qnet.fit(&states, &targets)?;
        self.n_opts += 1;

        let td_error_mean = errors.iter().sum::<f32>() / errors.len() as f32;
        debug!(
            "opt {}: loss = {}, td_error_mean = {}, epsilon = {}",
            self.n_opts,
            loss,
            td_error_mean,
            self.explorer.eps()
        );

        Ok(Some(Record::from_slice(&[
            ("loss", RecordValue::Scalar(loss)),
            ("epsilon", RecordValue::Scalar(self.explorer.eps())),
            ("td_error_mean", RecordValue::Scalar(td_error_mean)),
            ("priority_total", RecordValue::Scalar(self.memory.total())),
            ("td_errors", RecordValue::Array1(errors)),
        ])))
    }

    /// Replaces the target estimator with a copy of the online one.
    pub fn update_target(&mut self) {
        self.qnet_tgt = self.qnet.clone();
    }
}

impl<E, Q> Policy<E> for Dqn<Q, E::State>
where
    E: Env,
    Q: Estimator<E::State>,
{
    fn sample(&mut self, state: &E::State) -> Result<usize> {
        self.action(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dqn::EpsilonGreedyConfig, error::ReplayError, memory::ReplayMemoryConfig};

    /// Action values stored per integer state, fitted by overwriting.
    #[derive(Clone)]
    struct Table {
        values: Vec<Vec<f32>>,
    }

    impl Estimator<usize> for Table {
        fn predict(&self, states: &[usize]) -> Result<Vec<Vec<f32>>> {
            Ok(states.iter().map(|&s| self.values[s].clone()).collect())
        }

        fn fit(&mut self, states: &[usize], targets: &[Vec<f32>]) -> Result<f32> {
            let mut loss = 0f32;
            for (&s, t) in states.iter().zip(targets.iter()) {
                for (v, &t) in self.values[s].iter_mut().zip(t.iter()) {
                    loss += (*v - t).powi(2);
                    *v = t;
                }
            }
            Ok(loss / states.len() as f32)
        }
    }

    fn config() -> DqnConfig {
        DqnConfig::default()
            .memory(
                ReplayMemoryConfig::default()
                    .capacity(16)
                    .floor(0.5)
                    .exponent(1.0),
            )
            .batch_size(4)
            .warmup_period(4)
            .discount_factor(0.5)
            .explorer(EpsilonGreedyConfig::default().eps_decay(0.5))
    }

    fn table() -> Table {
        Table {
            values: vec![vec![1.0, 2.0], vec![0.0, 4.0], vec![0.0, 0.0]],
        }
    }

    #[test]
    fn test_push_stores_initial_transitions_as_terminal() -> Result<()> {
        let mut dqn = Dqn::build(&config(), table())?;

        // Q(0, 0) = 1, reward 0, stored as terminal: error 1.
        for _ in 0..4 {
            let ix = dqn.push(Transition::new(0, 0, 0.0, 1, false))?;
            assert_eq!(dqn.memory().sum_tree().priority(ix)?, 1.5);
            assert_eq!(
                dqn.memory().sum_tree().data(ix)?,
                &Transition::new(0, 0, 0.0, 1, true)
            );
        }

        // After the first decay the flag is kept and the target bootstraps:
        // |Q(1, 0) - 0.5 * max Q_tgt(1, .)| = 2.
        dqn.opt()?;
        let ix = dqn.push(Transition::new(1, 0, 0.0, 1, false))?;
        assert!(!dqn.memory().sum_tree().data(ix)?.is_done);
        assert_eq!(dqn.memory().sum_tree().priority(ix)?, 2.5);
        Ok(())
    }

    #[test]
    fn test_opt_warmup_and_record() -> Result<()> {
        let mut dqn = Dqn::build(&config(), table())?;
        for _ in 0..3 {
            dqn.push(Transition::new(0, 0, 0.0, 1, false))?;
        }
        assert!(dqn.opt()?.is_none());
        assert_eq!(dqn.epsilon(), 1.0);

        dqn.push(Transition::new(0, 1, 1.0, 2, true))?;
        let record = dqn.opt()?.unwrap();
        assert_eq!(dqn.n_opts(), 1);
        assert_eq!(record.get_scalar("epsilon")?, 0.5);
        assert_eq!(record.get_scalar("priority_total")?, dqn.memory().total());
        assert!(record.get_scalar("loss")? >= 0.0);
        let td_errors = record.get_array1("td_errors")?;
        assert_eq!(td_errors.len(), 4);
        let mean = td_errors.iter().sum::<f32>() / 4.0;
        assert!((record.get_scalar("td_error_mean")? - mean).abs() < 1e-6);

        // Rows are fitted in batch order and the transition of action 1 is in
        // the last segment: its target replaces the whole row.
        assert_eq!(dqn.qnet().values[0], vec![1.0, 1.0]);
        Ok(())
    }

    #[test]
    fn test_opt_updates_priorities_of_sampled() -> Result<()> {
        let mut dqn = Dqn::build(&config(), table())?;
        // Stored as terminal with error |Q(0, 0) - 0| = 1.
        for _ in 0..4 {
            dqn.push(Transition::new(0, 0, 0.0, 1, false))?;
        }
        assert_eq!(dqn.memory().total(), 6.0);

        // The first step still sees Q(0, 0) = 1 and fits it to 0.
        dqn.opt()?;
        assert!(dqn.memory().sum_tree().priorities().iter().all(|&p| p == 1.5));

        // The second step recomputes the errors as 0.
        dqn.opt()?;
        let tree = dqn.memory().sum_tree();
        assert!(tree.priorities().iter().all(|&p| p == 0.5));
        assert!((dqn.memory().total() - 2.0).abs() < 1e-5);
        Ok(())
    }

    #[test]
    fn test_build_rejects_unreachable_warmup() {
        // The memory can never hold the warmup period.
        let config_ = config()
            .memory(ReplayMemoryConfig::default().capacity(8))
            .batch_size(4)
            .warmup_period(16);
        let err = Dqn::build(&config_, table()).err().unwrap();
        assert_eq!(
            err.downcast_ref::<ReplayError>(),
            Some(&ReplayError::InvalidWarmup {
                batch_size: 4,
                warmup_period: 16,
                capacity: 8
            })
        );

        // The first batch would be larger than the stored transitions.
        let config_ = config().batch_size(64).warmup_period(10);
        assert!(Dqn::build(&config_, table()).is_err());
    }

    #[test]
    fn test_opt_starts_when_warmup_equals_capacity() -> Result<()> {
        let config_ = config()
            .memory(ReplayMemoryConfig::default().capacity(8))
            .batch_size(4)
            .warmup_period(8);
        let mut dqn = Dqn::build(&config_, table())?;
        for _ in 0..20 {
            dqn.push(Transition::new(2, 0, 0.0, 2, false))?;
            dqn.opt()?;
        }
        assert_eq!(dqn.memory().len(), 8);
        assert_eq!(dqn.n_opts(), 13);
        Ok(())
    }

    #[test]
    fn test_eval_is_greedy_and_update_target() -> Result<()> {
        let mut dqn = Dqn::build(&config(), table())?;
        dqn.eval();
        assert!(!dqn.is_train());
        for _ in 0..20 {
            assert_eq!(dqn.action(&1)?, 1);
        }
        dqn.train();
        assert!(dqn.is_train());

        dqn.push(Transition::new(1, 0, 0.0, 0, false))?;
        dqn.push(Transition::new(1, 0, 0.0, 0, false))?;
        dqn.push(Transition::new(1, 0, 0.0, 0, false))?;
        dqn.push(Transition::new(1, 0, 0.0, 0, false))?;
        dqn.opt()?;
        dqn.update_target();
        assert_eq!(dqn.qnet_tgt.values, dqn.qnet.values);
        Ok(())
    }
}

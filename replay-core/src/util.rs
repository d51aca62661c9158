//! Utilities for interaction of agents and environments.
use crate::{
    record::{Record, RecordValue, Recorder},
    Env, Policy,
};
use anyhow::Result;

/// Run episodes with a policy and recorder.
///
/// Every environment step is written to `recorder` as a record with
/// `episode`, `step` and `reward`. Returns the sum of rewards of each episode.
pub fn eval_with_recorder<E, P, R>(
    env: &mut E,
    policy: &mut P,
    n_episodes: usize,
    recorder: &mut R,
) -> Result<Vec<f32>>
where
    E: Env,
    P: Policy<E>,
    R: Recorder,
{
    let mut rs = Vec::new();

    for episode in 0..n_episodes {
        let mut prev_state = env.reset()?;
        let mut count_step = 0;
        let mut r_total = 0.0;

        loop {
            let act = policy.sample(&prev_state)?;
            let (state, reward, is_done) = env.step(act)?;
            r_total += reward;

            let mut record = Record::empty();
            record.insert("episode", RecordValue::Scalar(episode as _));
            record.insert("step", RecordValue::Scalar(count_step as _));
            record.insert("reward", RecordValue::Scalar(reward));
            recorder.write(record);

            if is_done {
                break;
            }
            prev_state = state;
            count_step += 1;
        }
        rs.push(r_total);
    }

    Ok(rs)
}

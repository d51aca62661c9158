//! Transition.

/// A transition `(s_t, a_t, r_t, s_t+1, done_t)`.
///
/// Replay memories store it without looking inside.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition<S> {
    /// State before the action.
    pub state: S,

    /// Action taken.
    pub act: usize,

    /// Reward received.
    pub reward: f32,

    /// State after the action.
    pub next_state: S,

    /// Flag denoting if the episode ended with this transition.
    pub is_done: bool,
}

impl<S> Transition<S> {
    /// Constructs a transition.
    pub fn new(state: S, act: usize, reward: f32, next_state: S, is_done: bool) -> Self {
        Self {
            state,
            act,
            reward,
            next_state,
            is_done,
        }
    }
}

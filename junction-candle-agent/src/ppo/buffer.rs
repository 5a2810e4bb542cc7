//! Storage of one trajectory.
use super::PpoError;
use anyhow::Result;
use junction_core::ExperienceBufferBase;

/// Data of one environment step.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// Observation the action was taken on.
    pub state: Vec<f32>,

    /// Index of the discrete action.
    pub action: u32,

    /// Log-probability of `action` under the policy at collection time.
    pub logprob: f32,

    /// Reward received for the action.
    pub reward: f32,

    /// Whether the step terminated or truncated the episode.
    pub done: bool,

    /// Value estimate of `state` at collection time.
    pub value: f32,
}

/// Borrowed view of the six sequences of a [`TransitionBuffer`], in insertion order.
#[derive(Debug, Clone, Copy)]
pub struct Trajectory<'a> {
    /// Observations.
    pub states: &'a [Vec<f32>],

    /// Actions.
    pub actions: &'a [u32],

    /// Log-probabilities of the actions at collection time.
    pub logprobs: &'a [f32],

    /// Rewards.
    pub rewards: &'a [f32],

    /// Episode boundary flags.
    pub dones: &'a [bool],

    /// Value estimates at collection time.
    pub values: &'a [f32],
}

/// Append-only store of the transitions collected since the last update.
///
/// The buffer keeps six parallel sequences. Order is significant: it is the
/// temporal order used by the advantage recurrence, and several episodes may
/// follow each other, separated by `done` flags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionBuffer {
    states: Vec<Vec<f32>>,
    actions: Vec<u32>,
    logprobs: Vec<f32>,
    rewards: Vec<f32>,
    dones: Vec<bool>,
    values: Vec<f32>,
}

impl TransitionBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a buffer from pre-recorded sequences.
    ///
    /// No validation is done here; [`TransitionBuffer::check_consistency`]
    /// runs when the trajectory is consumed.
    pub fn from_parts(
        states: Vec<Vec<f32>>,
        actions: Vec<u32>,
        logprobs: Vec<f32>,
        rewards: Vec<f32>,
        dones: Vec<bool>,
        values: Vec<f32>,
    ) -> Self {
        Self {
            states,
            actions,
            logprobs,
            rewards,
            dones,
            values,
        }
    }

    /// Appends a transition.
    pub fn append(&mut self, tr: Transition) {
        self.states.push(tr.state);
        self.actions.push(tr.action);
        self.logprobs.push(tr.logprob);
        self.rewards.push(tr.reward);
        self.dones.push(tr.done);
        self.values.push(tr.value);
    }

    /// Returns the stored sequences.
    pub fn read_all(&self) -> Trajectory<'_> {
        Trajectory {
            states: &self.states,
            actions: &self.actions,
            logprobs: &self.logprobs,
            rewards: &self.rewards,
            dones: &self.dones,
            values: &self.values,
        }
    }

    /// Discards all the stored transitions.
    pub fn clear(&mut self) {
        self.states = Vec::new();
        self.actions = Vec::new();
        self.logprobs = Vec::new();
        self.rewards = Vec::new();
        self.dones = Vec::new();
        self.values = Vec::new();
    }

    /// Number of stored states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Returns `true` if no state is stored.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Checks that the six sequences have the same length and that all
    /// states have the same dimension, which is returned.
    pub fn check_consistency(&self) -> Result<usize, PpoError> {
        let n = self.states.len();
        let lens = [
            ("actions", self.actions.len()),
            ("logprobs", self.logprobs.len()),
            ("rewards", self.rewards.len()),
            ("dones", self.dones.len()),
            ("values", self.values.len()),
        ];
        if let Some((name, len)) = lens.iter().find(|(_, len)| *len != n) {
            return Err(PpoError::ShapeMismatch(format!(
                "{} states but {} {}",
                n, len, name
            )));
        }

        let obs_dim = self.states.first().map_or(0, |s| s.len());
        if let Some((i, s)) = self
            .states
            .iter()
            .enumerate()
            .find(|(_, s)| s.len() != obs_dim)
        {
            return Err(PpoError::ShapeMismatch(format!(
                "state {} has dimension {}, expected {}",
                i,
                s.len(),
                obs_dim
            )));
        }

        Ok(obs_dim)
    }
}

impl ExperienceBufferBase for TransitionBuffer {
    type Item = Transition;

    fn push(&mut self, tr: Transition) -> Result<()> {
        self.append(tr);
        Ok(())
    }

    fn len(&self) -> usize {
        TransitionBuffer::len(self)
    }
}

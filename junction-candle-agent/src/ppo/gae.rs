//! Generalized advantage estimation (GAE-λ).
use super::PpoError;

/// Computes per-step advantages and return targets of a trajectory.
///
/// The value after the last step of the trajectory is taken to be `0`, whether
/// the trajectory ended on a terminal state or was cut off.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdvantageEstimator {
    gamma: f32,
    gae_lambda: f32,
}

impl AdvantageEstimator {
    /// Creates the estimator. Both `gamma` and `gae_lambda` must lie in `[0, 1]`.
    pub fn new(gamma: f32, gae_lambda: f32) -> Result<Self, PpoError> {
        if !(0.0..=1.0).contains(&gamma) {
            return Err(PpoError::Configuration(format!(
                "gamma must be in [0, 1], got {}",
                gamma
            )));
        }
        if !(0.0..=1.0).contains(&gae_lambda) {
            return Err(PpoError::Configuration(format!(
                "gae_lambda must be in [0, 1], got {}",
                gae_lambda
            )));
        }
        Ok(Self { gamma, gae_lambda })
    }

    /// Returns `(advantages, returns)` in chronological order.
    ///
    /// The recurrence runs from the last step to the first; `done[t]` cuts
    /// both the bootstrap from `values[t + 1]` and the carried advantage, so
    /// episodes concatenated in one trajectory do not leak into each other.
    /// `returns[t] = advantages[t] + values[t]`.
    pub fn compute(
        &self,
        rewards: &[f32],
        values: &[f32],
        dones: &[bool],
    ) -> Result<(Vec<f32>, Vec<f32>), PpoError> {
        let n = rewards.len();
        if values.len() != n || dones.len() != n {
            return Err(PpoError::ShapeMismatch(format!(
                "{} rewards, {} values, {} dones",
                n,
                values.len(),
                dones.len()
            )));
        }

        let mut advantages = vec![0f32; n];
        let mut gae = 0f32;

        for t in (0..n).rev() {
            let next_value = if t + 1 < n { values[t + 1] } else { 0.0 };
            let not_done = if dones[t] { 0.0 } else { 1.0 };
            let delta = rewards[t] + self.gamma * next_value * not_done - values[t];
            gae = delta + self.gamma * self.gae_lambda * not_done * gae;
            advantages[t] = gae;
        }

        let returns = advantages
            .iter()
            .zip(values.iter())
            .map(|(a, v)| a + v)
            .collect();

        Ok((advantages, returns))
    }
}

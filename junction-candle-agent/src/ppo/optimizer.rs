//! Clipped-surrogate policy optimization.
use super::{ActorCritic, AdvantageEstimator, PpoConfig, PpoError, Transition, TransitionBuffer};
use anyhow::Result;
use candle_core::Tensor;
use junction_core::record::{Record, RecordValue};
use log::{info, trace};

/// Per-sample clipped surrogate `min(r * A, clip(r, 1 - ε, 1 + ε) * A)`.
///
/// `ratio` and `advantages` have the same shape. Gradients flow through
/// whichever term is selected by the minimum.
pub fn clipped_surrogate(ratio: &Tensor, advantages: &Tensor, clip: f64) -> Result<Tensor> {
    let surr1 = (ratio * advantages)?;
    let surr2 = (ratio.clamp(1.0 - clip, 1.0 + clip)? * advantages)?;
    Ok(surr1.minimum(&surr2)?)
}

/// Diagnostics accumulated over the epochs of one update.
#[derive(Debug, Default)]
struct UpdateStats {
    loss_actor: f32,
    loss_critic: f32,
    loss: f32,
    ratio_mean: f32,
    clip_fraction: f32,
}

impl UpdateStats {
    fn into_record(self, n_epochs: usize, n_transitions: usize) -> Record {
        let n = n_epochs as f32;
        Record::from_slice(&[
            ("loss_actor", RecordValue::Scalar(self.loss_actor / n)),
            ("loss_critic", RecordValue::Scalar(self.loss_critic / n)),
            ("loss", RecordValue::Scalar(self.loss / n)),
            ("ratio_mean", RecordValue::Scalar(self.ratio_mean / n)),
            ("clip_fraction", RecordValue::Scalar(self.clip_fraction / n)),
            ("n_transitions", RecordValue::Scalar(n_transitions as f32)),
        ])
    }
}

/// Trains an [`ActorCritic`] on the trajectories stored in its buffer.
///
/// The optimizer is either collecting, accepting transitions with
/// [`PpoOptimizer::push`], or inside [`PpoOptimizer::update`]. Both take
/// `&mut self`, so no transition can be pushed while an update runs.
pub struct PpoOptimizer {
    model: ActorCritic,
    buffer: TransitionBuffer,
    gae: AdvantageEstimator,
    clip: f64,
    n_epochs: usize,
    value_loss_coef: f64,
}

impl PpoOptimizer {
    /// Creates the optimizer. The hyperparameters are taken from `config`.
    ///
    /// `model` must have been built from `config.model_config`, otherwise
    /// [`PpoError::Configuration`] is returned.
    pub fn new(model: ActorCritic, buffer: TransitionBuffer, config: &PpoConfig) -> Result<Self> {
        config.validate()?;
        if model.config() != &config.model_config {
            return Err(PpoError::Configuration(
                "the model was not built from the given model configuration".into(),
            )
            .into());
        }
        let gae = AdvantageEstimator::new(config.gamma as f32, config.gae_lambda as f32)?;

        Ok(Self {
            model,
            buffer,
            gae,
            clip: config.clip,
            n_epochs: config.n_epochs,
            value_loss_coef: config.value_loss_coef,
        })
    }

    /// Appends a transition to the buffer.
    pub fn push(&mut self, tr: Transition) {
        self.buffer.append(tr);
    }

    /// Returns the buffer.
    pub fn buffer(&self) -> &TransitionBuffer {
        &self.buffer
    }

    /// Returns the network.
    pub fn model(&self) -> &ActorCritic {
        &self.model
    }

    /// Returns the network mutably, for loading parameters.
    pub fn model_mut(&mut self) -> &mut ActorCritic {
        &mut self.model
    }

    /// Runs `n_epochs` gradient steps on the stored trajectory.
    ///
    /// The trajectory is moved out of the buffer first, so the buffer is
    /// empty when this method returns, whatever the outcome.
    ///
    /// Fails with [`PpoError::EmptyTrajectory`] if nothing was pushed,
    /// [`PpoError::ShapeMismatch`] if the stored sequences are inconsistent and
    /// [`PpoError::NumericDivergence`] if the loss or a gradient is not
    /// finite, in which case the offending epoch takes no step, or if the
    /// step left a parameter non-finite.
    pub fn update(&mut self) -> Result<Record> {
        let buffer = std::mem::take(&mut self.buffer);
        if buffer.is_empty() {
            return Err(PpoError::EmptyTrajectory.into());
        }
        let obs_dim = buffer.check_consistency()?;
        if obs_dim != self.model.config().obs_dim {
            return Err(PpoError::ShapeMismatch(format!(
                "states have dimension {}, the network expects {}",
                obs_dim,
                self.model.config().obs_dim
            ))
            .into());
        }

        let tr = buffer.read_all();
        let n = buffer.len();
        let (advantages, returns) = self.gae.compute(tr.rewards, tr.values, tr.dones)?;

        let device = self.model.device().clone();
        let states = Tensor::from_vec(tr.states.concat(), (n, obs_dim), &device)?;
        let actions = Tensor::from_slice(tr.actions, (n,), &device)?;
        let old_logprobs = Tensor::from_slice(tr.logprobs, (n,), &device)?;
        let advantages = Tensor::from_vec(advantages, (n,), &device)?;
        let returns = Tensor::from_vec(returns, (n,), &device)?;

        let mut stats = UpdateStats::default();

        for epoch in 0..self.n_epochs {
            let (logits, values) = self.model.evaluate(&states)?;
            let new_logprobs = self.model.log_prob(&logits, &actions)?;
            let ratio = (new_logprobs - &old_logprobs)?.exp()?;

            let loss_actor = clipped_surrogate(&ratio, &advantages, self.clip)?
                .mean_all()?
                .neg()?;
            let loss_critic = (values - &returns)?.sqr()?.mean_all()?;
            let loss = (&loss_actor + loss_critic.affine(self.value_loss_coef, 0.0)?)?;

            let loss_value = loss.to_scalar::<f32>()?;
            if !loss_value.is_finite() {
                return Err(PpoError::NumericDivergence(format!(
                    "loss {} at epoch {}",
                    loss_value, epoch
                ))
                .into());
            }

            let ratio = ratio.to_vec1::<f32>()?;
            let ratio_mean = ratio.iter().sum::<f32>() / n as f32;
            let clip_fraction = ratio
                .iter()
                .filter(|r| (**r - 1.0).abs() as f64 > self.clip)
                .count() as f32
                / n as f32;
            let loss_actor = loss_actor.to_scalar::<f32>()?;
            let loss_critic = loss_critic.to_scalar::<f32>()?;
            trace!(
                "epoch {}: loss_actor={}, loss_critic={}, ratio_mean={}, clip_fraction={}",
                epoch,
                loss_actor,
                loss_critic,
                ratio_mean,
                clip_fraction
            );

            self.model.backward_step(&loss)?;

            stats.loss_actor += loss_actor;
            stats.loss_critic += loss_critic;
            stats.loss += loss_value;
            stats.ratio_mean += ratio_mean;
            stats.clip_fraction += clip_fraction;
        }

        info!(
            "Update on {} transitions, loss = {}",
            n,
            stats.loss / self.n_epochs as f32
        );
        Ok(stats.into_record(self.n_epochs, n))
    }
}

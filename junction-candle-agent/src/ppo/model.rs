//! Actor-critic network.
use super::PpoError;
use crate::{
    mlp::{Mlp, MlpConfig},
    model::SubModel1,
    opt::{Optimizer, OptimizerConfig},
    util::{argmax, categorical_log_prob, is_finite, sample_categorical},
};
use anyhow::Result;
use candle_core::{DType, Device, Tensor, D};
use candle_nn::{ops::log_softmax, VarBuilder, VarMap};
use log::info;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`ActorCritic`].
pub struct ActorCriticConfig {
    /// Dimension of the observation vector.
    pub obs_dim: usize,

    /// Number of discrete actions.
    pub n_actions: usize,

    /// Widths of the shared trunk layers. The last entry is the feature size
    /// fed to both heads.
    pub trunk_units: Vec<usize>,

    /// Widths of the hidden layers of each head.
    pub head_units: Vec<usize>,

    /// Optimizer of all the parameters.
    #[serde(default)]
    pub opt_config: OptimizerConfig,
}

impl Default for ActorCriticConfig {
    fn default() -> Self {
        Self {
            obs_dim: 0,
            n_actions: 0,
            trunk_units: vec![128],
            head_units: vec![128],
            opt_config: OptimizerConfig::default(),
        }
    }
}

impl ActorCriticConfig {
    /// Sets the dimension of observations.
    pub fn obs_dim(mut self, v: usize) -> Self {
        self.obs_dim = v;
        self
    }

    /// Sets the number of actions.
    pub fn n_actions(mut self, v: usize) -> Self {
        self.n_actions = v;
        self
    }

    /// Sets the widths of the shared trunk.
    pub fn trunk_units(mut self, v: Vec<usize>) -> Self {
        self.trunk_units = v;
        self
    }

    /// Sets the widths of the hidden layers of the heads.
    pub fn head_units(mut self, v: Vec<usize>) -> Self {
        self.head_units = v;
        self
    }

    /// Sets optimizer configuration.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }

    /// Checks the dimensions and the learning rate.
    pub fn validate(&self) -> Result<(), PpoError> {
        if self.obs_dim == 0 {
            return Err(PpoError::Configuration("obs_dim must be positive".into()));
        }
        if self.n_actions == 0 {
            return Err(PpoError::Configuration("n_actions must be positive".into()));
        }
        if self.trunk_units.is_empty() {
            return Err(PpoError::Configuration(
                "trunk_units must have at least one layer".into(),
            ));
        }
        if self.trunk_units.iter().chain(self.head_units.iter()).any(|&u| u == 0) {
            return Err(PpoError::Configuration("layer widths must be positive".into()));
        }
        let lr = self.opt_config.lr();
        if !(lr > 0.0 && (lr as f32).is_finite()) {
            return Err(PpoError::Configuration(format!(
                "learning rate must be positive and finite, got {}",
                lr
            )));
        }
        Ok(())
    }

    fn trunk_config(&self) -> MlpConfig {
        let (out_dim, units) = match self.trunk_units.split_last() {
            Some((last, units)) => (*last, units.to_vec()),
            None => (self.obs_dim, vec![]),
        };
        MlpConfig::new(self.obs_dim, units, out_dim, true)
    }

    fn head_config(&self, out_dim: usize) -> MlpConfig {
        let in_dim = self.trunk_units.last().copied().unwrap_or(self.obs_dim);
        MlpConfig::new(in_dim, self.head_units.clone(), out_dim, false)
    }
}

/// Policy and value network with a shared trunk.
///
/// The trunk feeds two independent heads: the actor outputs the logits of a
/// categorical distribution over actions, the critic a scalar state value.
/// All parameters live in one [`VarMap`] and are updated by one optimizer,
/// so the trunk receives gradients from both heads.
pub struct ActorCritic {
    device: Device,
    varmap: VarMap,
    config: ActorCriticConfig,
    trunk: Mlp,
    actor: Mlp,
    critic: Mlp,
    opt: Optimizer,
}

impl ActorCritic {
    /// Constructs [`ActorCritic`] with freshly initialized parameters.
    pub fn build(config: ActorCriticConfig, device: Device) -> Result<Self> {
        config.validate()?;
        let varmap = VarMap::new();
        let (trunk, actor, critic) = {
            let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
            let trunk = Mlp::build(vb.pp("trunk"), config.trunk_config())?;
            let actor = Mlp::build(vb.pp("actor"), config.head_config(config.n_actions))?;
            let critic = Mlp::build(vb.pp("critic"), config.head_config(1))?;
            (trunk, actor, critic)
        };
        let opt = config.opt_config.build(varmap.all_vars())?;

        Ok(Self {
            device,
            varmap,
            config,
            trunk,
            actor,
            critic,
            opt,
        })
    }

    /// Returns `(logits, values)` for a batch of states.
    ///
    /// `states` has shape `(batch_size, obs_dim)`; `logits` has shape
    /// `(batch_size, n_actions)` and `values` has shape `(batch_size,)`.
    pub fn evaluate(&self, states: &Tensor) -> Result<(Tensor, Tensor)> {
        let h = self.trunk.forward(states)?;
        let logits = self.actor.forward(&h)?;
        let values = self.critic.forward(&h)?.squeeze(D::Minus1)?;
        Ok((logits, values))
    }

    /// Log-probabilities of `actions` (dtype `u32`, shape `(batch_size,)`)
    /// under the logits returned by [`ActorCritic::evaluate`].
    pub fn log_prob(&self, logits: &Tensor, actions: &Tensor) -> Result<Tensor> {
        Ok(categorical_log_prob(logits, actions)?)
    }

    fn evaluate_one(&self, obs: &[f32]) -> Result<(Vec<f32>, f32)> {
        if obs.len() != self.config.obs_dim {
            return Err(PpoError::ShapeMismatch(format!(
                "observation has dimension {}, expected {}",
                obs.len(),
                self.config.obs_dim
            ))
            .into());
        }
        let xs = Tensor::from_slice(obs, (1, obs.len()), &self.device)?;
        let (logits, values) = self.evaluate(&xs)?;
        let log_probs = log_softmax(&logits, D::Minus1)?
            .squeeze(0)?
            .to_vec1::<f32>()?;
        let value = values.squeeze(0)?.to_scalar::<f32>()?;
        Ok((log_probs, value))
    }

    /// Samples an action for a single observation.
    ///
    /// Returns `(action, log-probability of the action, value estimate)`.
    /// All randomness comes from `rng`.
    pub fn sample_action<R: Rng>(&self, obs: &[f32], rng: &mut R) -> Result<(u32, f32, f32)> {
        let (log_probs, value) = self.evaluate_one(obs)?;
        let action = sample_categorical(&log_probs, rng).ok_or_else(|| {
            PpoError::NumericDivergence(format!("invalid action distribution {:?}", log_probs))
        })?;
        Ok((action as u32, log_probs[action], value))
    }

    /// Returns the most probable action for a single observation.
    pub fn greedy_action(&self, obs: &[f32]) -> Result<u32> {
        let (log_probs, _) = self.evaluate_one(obs)?;
        Ok(argmax(&log_probs) as u32)
    }

    /// Computes gradients of `loss` and updates all parameters.
    ///
    /// Fails with [`PpoError::NumericDivergence`] without touching the
    /// parameters if a gradient is not finite, and after the step if a
    /// parameter became non-finite.
    pub fn backward_step(&mut self, loss: &Tensor) -> Result<()> {
        let grads = loss.backward()?;
        let vars = self.varmap.all_vars();

        for var in vars.iter() {
            if let Some(grad) = grads.get(var) {
                if !is_finite(grad)? {
                    return Err(PpoError::NumericDivergence("non-finite gradient".into()).into());
                }
            }
        }

        self.opt.step(&grads)?;

        for var in vars.iter() {
            if !is_finite(var.as_tensor())? {
                return Err(PpoError::NumericDivergence(
                    "non-finite parameter after the optimizer step".into(),
                )
                .into());
            }
        }
        Ok(())
    }

    /// Returns the configuration of the network.
    pub fn config(&self) -> &ActorCriticConfig {
        &self.config
    }

    /// Returns the device the parameters live on.
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Saves the parameters in safetensors format.
    pub fn save<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        self.varmap.save(&path)?;
        info!("Save actor-critic to {:?}", path.as_ref());
        Ok(())
    }

    /// Loads the parameters saved with [`ActorCritic::save`].
    pub fn load<T: AsRef<Path>>(&mut self, path: T) -> Result<()> {
        self.varmap.load(&path)?;
        info!("Load actor-critic from {:?}", path.as_ref());
        Ok(())
    }
}

//! Configuration of PPO agent.
use super::{ActorCriticConfig, PpoError};
use crate::{opt::OptimizerConfig, Device};
use anyhow::Result;
use junction_core::OptInterval;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Ppo`](super::Ppo) agent.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct PpoConfig {
    /// Configuration of the actor-critic network and its optimizer.
    pub model_config: ActorCriticConfig,

    /// Discount factor.
    #[serde(default = "default_gamma")]
    pub gamma: f64,

    /// Parameter of generalized advantage estimation.
    #[serde(default = "default_gae_lambda")]
    pub gae_lambda: f64,

    /// Clipping range ε of the probability ratio.
    #[serde(default = "default_clip")]
    pub clip: f64,

    /// Number of passes over the trajectory in one update.
    #[serde(default = "default_n_epochs", alias = "K")]
    pub n_epochs: usize,

    /// Weight of the critic loss in the joint loss.
    #[serde(default = "default_value_loss_coef")]
    pub value_loss_coef: f64,

    /// When [`train_step`](junction_core::Agent::train_step) runs an update.
    #[serde(default)]
    pub opt_interval: OptInterval,

    /// Seed of the random number generator used for action sampling.
    #[serde(default)]
    pub seed: u64,

    /// Device. [`Device::Cpu`] if not given.
    #[serde(default)]
    pub device: Option<Device>,
}

fn default_gamma() -> f64 {
    0.99
}

fn default_gae_lambda() -> f64 {
    0.95
}

fn default_clip() -> f64 {
    0.2
}

fn default_n_epochs() -> usize {
    4
}

fn default_value_loss_coef() -> f64 {
    0.5
}

impl Default for PpoConfig {
    fn default() -> Self {
        Self {
            model_config: ActorCriticConfig::default(),
            gamma: default_gamma(),
            gae_lambda: default_gae_lambda(),
            clip: default_clip(),
            n_epochs: default_n_epochs(),
            value_loss_coef: default_value_loss_coef(),
            opt_interval: OptInterval::default(),
            seed: 0,
            device: None,
        }
    }
}

impl PpoConfig {
    /// Sets the configuration of the model.
    pub fn model_config(mut self, model_config: ActorCriticConfig) -> Self {
        self.model_config = model_config;
        self
    }

    /// Sets the discount factor.
    pub fn gamma(mut self, v: f64) -> Self {
        self.gamma = v;
        self
    }

    /// Sets the parameter of generalized advantage estimation.
    pub fn gae_lambda(mut self, v: f64) -> Self {
        self.gae_lambda = v;
        self
    }

    /// Sets the clipping range.
    pub fn clip(mut self, v: f64) -> Self {
        self.clip = v;
        self
    }

    /// Sets the number of epochs per update.
    pub fn n_epochs(mut self, v: usize) -> Self {
        self.n_epochs = v;
        self
    }

    /// Sets the weight of the critic loss.
    pub fn value_loss_coef(mut self, v: f64) -> Self {
        self.value_loss_coef = v;
        self
    }

    /// Sets the learning rate of the optimizer.
    pub fn learning_rate(mut self, lr: f64) -> Self {
        self.model_config.opt_config = self.model_config.opt_config.learning_rate(lr);
        self
    }

    /// Sets the optimizer.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.model_config.opt_config = v;
        self
    }

    /// Sets the optimization interval.
    pub fn opt_interval(mut self, v: OptInterval) -> Self {
        self.opt_interval = v;
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Sets the device.
    pub fn device(mut self, device: Device) -> Self {
        self.device = Some(device);
        self
    }

    /// Checks the hyperparameters.
    pub fn validate(&self) -> Result<(), PpoError> {
        if !(self.clip > 0.0 && self.clip.is_finite()) {
            return Err(PpoError::Configuration(format!(
                "clip must be positive, got {}",
                self.clip
            )));
        }
        if self.n_epochs == 0 {
            return Err(PpoError::Configuration("n_epochs must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(PpoError::Configuration(format!(
                "gamma must be in [0, 1], got {}",
                self.gamma
            )));
        }
        if !(0.0..=1.0).contains(&self.gae_lambda) {
            return Err(PpoError::Configuration(format!(
                "gae_lambda must be in [0, 1], got {}",
                self.gae_lambda
            )));
        }
        if !(self.value_loss_coef >= 0.0 && self.value_loss_coef.is_finite()) {
            return Err(PpoError::Configuration(format!(
                "value_loss_coef must be non-negative, got {}",
                self.value_loss_coef
            )));
        }
        if let Err(e) = self.opt_interval.counter() {
            return Err(PpoError::Configuration(e.to_string()));
        }
        self.model_config.validate()
    }

    /// Constructs [`PpoConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`PpoConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    fn config() -> PpoConfig {
        PpoConfig::default().model_config(ActorCriticConfig::default().obs_dim(4).n_actions(2))
    }

    #[test]
    fn test_defaults() {
        let config = config();
        assert_eq!(config.gamma, 0.99);
        assert_eq!(config.gae_lambda, 0.95);
        assert_eq!(config.clip, 0.2);
        assert_eq!(config.n_epochs, 4);
        assert_eq!(config.value_loss_coef, 0.5);
        assert_eq!(config.model_config.opt_config.lr(), 3e-4);
        assert_eq!(config.opt_interval, OptInterval::Episodes(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let invalid = [
            config().clip(0.0),
            config().clip(-0.1),
            config().n_epochs(0),
            config().gamma(1.5),
            config().gae_lambda(-0.5),
            config().learning_rate(0.0),
            config().value_loss_coef(f64::NAN),
            config().opt_interval(OptInterval::Steps(0)),
            config().model_config(ActorCriticConfig::default().n_actions(2)),
        ];
        for c in invalid.iter() {
            assert!(
                matches!(c.validate(), Err(PpoError::Configuration(_))),
                "{:?}",
                c
            );
        }
    }

    #[test]
    fn test_serde_ppo_config() -> Result<()> {
        let config = config()
            .gamma(0.9)
            .n_epochs(8)
            .learning_rate(1e-3)
            .opt_interval(OptInterval::Steps(64))
            .seed(42)
            .device(Device::Cpu);

        let dir = TempDir::new("ppo_config")?;
        let path = dir.path().join("ppo.yaml");
        config.save(&path)?;
        let config_ = PpoConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }

    #[test]
    fn test_short_yaml() -> Result<()> {
        let yaml = "model_config:\n  obs_dim: 3\n  n_actions: 2\n  trunk_units: [32]\n  head_units: [32]\nK: 10\n";
        let config: PpoConfig = serde_yaml::from_str(yaml)?;
        assert_eq!(config.n_epochs, 10);
        assert_eq!(config.clip, 0.2);
        assert_eq!(config.model_config.opt_config, OptimizerConfig::default());
        Ok(())
    }
}

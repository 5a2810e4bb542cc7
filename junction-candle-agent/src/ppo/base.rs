//! PPO agent.
use super::{ActorCritic, PpoConfig, PpoError, PpoOptimizer, Transition, TransitionBuffer};
use anyhow::Result;
use junction_core::{
    record::{Record, RecordValue},
    Agent, Configurable, Env, OptIntervalCounter, Policy, Step,
};
use log::info;
use rand::{rngs::SmallRng, SeedableRng};
use std::{
    fs,
    marker::PhantomData,
    path::{Path, PathBuf},
};

const CONFIG_FILE: &str = "ppo.yaml";
const MODEL_FILE: &str = "actor_critic.safetensors";

/// Observation, action, log-probability and value retained between
/// [`Policy::sample`] and [`Agent::train_step`].
struct PendingAction {
    state: Vec<f32>,
    action: u32,
    logprob: f32,
    value: f32,
}

/// Proximal policy optimization agent for discrete action spaces.
///
/// Observations are flattened into `Vec<f32>`, actions are built from the
/// index of the sampled action. One transition is stored per
/// [`Agent::train_step`]; the [`OptInterval`](junction_core::OptInterval) of
/// the configuration decides when the stored trajectory is consumed by
/// [`PpoOptimizer::update`].
pub struct Ppo<E>
where
    E: Env,
{
    opt: PpoOptimizer,
    opt_interval_counter: OptIntervalCounter,
    pending: Option<PendingAction>,
    train: bool,
    rng: SmallRng,
    config: PpoConfig,
    n_opts: usize,
    phantom: PhantomData<E>,
}

impl<E> Ppo<E>
where
    E: Env,
{
    /// Returns the optimizer, holding the network and the buffer.
    pub fn optimizer(&self) -> &PpoOptimizer {
        &self.opt
    }

    /// Returns the configuration.
    pub fn config(&self) -> &PpoConfig {
        &self.config
    }

    /// Number of updates performed so far.
    pub fn n_opts(&self) -> usize {
        self.n_opts
    }

    /// Reconstructs an agent from a directory written by [`Agent::save_params`].
    ///
    /// The hyperparameters come from `ppo.yaml`, the weights from
    /// `actor_critic.safetensors`.
    pub fn build_from_dir(path: impl AsRef<Path>) -> Result<Self>
    where
        E::Obs: Into<Vec<f32>>,
        E::Act: From<u32>,
    {
        let path = path.as_ref();
        let config = PpoConfig::load(path.join(CONFIG_FILE))?;
        info!("Load PPO configuration from {:?}", path.join(CONFIG_FILE));
        let mut agent = Self::build(config)?;
        agent.opt.model_mut().load(Self::model_file(path))?;
        Ok(agent)
    }

    fn model_file(path: &Path) -> PathBuf {
        path.join(MODEL_FILE)
    }
}

impl<E> Policy<E> for Ppo<E>
where
    E: Env,
    E::Obs: Into<Vec<f32>>,
    E::Act: From<u32>,
{
    /// In training mode, samples an action from the policy and keeps the
    /// data needed to build the transition in [`Agent::train_step`]. In
    /// evaluation mode, returns the most probable action.
    fn sample(&mut self, obs: &E::Obs) -> Result<E::Act> {
        let state: Vec<f32> = obs.clone().into();

        if self.train {
            let (action, logprob, value) = self.opt.model().sample_action(&state, &mut self.rng)?;
            self.pending = Some(PendingAction {
                state,
                action,
                logprob,
                value,
            });
            Ok(action.into())
        } else {
            Ok(self.opt.model().greedy_action(&state)?.into())
        }
    }
}

impl<E> Configurable<E> for Ppo<E>
where
    E: Env,
    E::Obs: Into<Vec<f32>>,
    E::Act: From<u32>,
{
    type Config = PpoConfig;

    /// Constructs [`Ppo`] agent.
    fn build(config: Self::Config) -> Result<Self> {
        config.validate()?;
        let device = config.device.unwrap_or_default().to_candle()?;
        let model = ActorCritic::build(config.model_config.clone(), device)?;
        let opt = PpoOptimizer::new(model, TransitionBuffer::new(), &config)?;
        let opt_interval_counter = config.opt_interval.counter()?;

        Ok(Ppo {
            opt,
            opt_interval_counter,
            pending: None,
            train: false,
            rng: SmallRng::seed_from_u64(config.seed),
            config,
            n_opts: 0,
            phantom: PhantomData,
        })
    }
}

impl<E> Agent<E> for Ppo<E>
where
    E: Env,
    E::Obs: Into<Vec<f32>>,
    E::Act: From<u32>,
{
    fn train(&mut self) {
        self.train = true;
    }

    fn eval(&mut self) {
        self.train = false;
    }

    fn is_train(&self) -> bool {
        self.train
    }

    /// Drops the action retained by the last [`Policy::sample`].
    fn reset(&mut self) {
        self.pending = None;
    }

    /// Stores the transition of the last sampled action and, when the
    /// optimization interval is reached, updates the network.
    fn train_step(&mut self, step: &Step<E>) -> Result<Option<Record>> {
        let pending = self.pending.take().ok_or(PpoError::NoPendingAction)?;
        let done = step.is_done();
        self.opt.push(Transition {
            state: pending.state,
            action: pending.action,
            logprob: pending.logprob,
            reward: step.reward,
            done,
            value: pending.value,
        });

        if !self.opt_interval_counter.do_optimize(done) {
            return Ok(None);
        }

        let mut record = self.opt.update()?;
        self.n_opts += 1;
        record.insert("n_opts", RecordValue::Scalar(self.n_opts as f32));
        Ok(Some(record))
    }

    /// Writes `ppo.yaml` and `actor_critic.safetensors` in `path`, creating
    /// the directory if needed.
    fn save_params(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)?;
        self.config.save(path.join(CONFIG_FILE))?;
        self.opt.model().save(Self::model_file(path))?;
        info!("Save PPO agent to {:?}", path);
        Ok(())
    }

    /// Restores the weights saved by [`Agent::save_params`].
    ///
    /// The configuration in the directory is not read; use
    /// [`Ppo::build_from_dir`] to reconstruct the hyperparameters too.
    fn load_params(&mut self, path: &Path) -> Result<()> {
        self.opt.model_mut().load(Self::model_file(path))?;
        info!("Load PPO agent from {:?}", path);
        Ok(())
    }
}

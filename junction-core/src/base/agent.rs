//! Agent.
use super::{Env, Policy, Step};
use crate::record::Record;
use anyhow::Result;
use std::path::Path;

/// Represents a trainable policy on an environment.
///
/// This is the capability contract shared by all algorithm variants. An
/// experiment runner drives any of them through the same loop:
///
/// ```ignore
/// let mut obs = env.reset()?;
/// agent.reset();
/// loop {
///     let act = agent.sample(&obs)?;       // select_action
///     let (step, _) = env.step(&act)?;
///     let record = agent.train_step(&step)?;
///     obs = if step.is_done() { agent.reset(); env.reset()? } else { step.obs };
/// }
/// ```
///
/// The trait is object safe, so a runner can hold `Box<dyn Agent<E>>`.
pub trait Agent<E: Env>: Policy<E> {
    /// Set the policy to training mode.
    fn train(&mut self);

    /// Set the policy to evaluation mode.
    fn eval(&mut self);

    /// Return if it is in training mode.
    fn is_train(&self) -> bool;

    /// Clears the internal episodic state of the agent.
    fn reset(&mut self);

    /// Consumes the outcome of the last action taken with [`Policy::sample`].
    ///
    /// Depending on the algorithm this stores a transition, updates a table
    /// or runs an optimization step. When an optimization step was performed,
    /// the returned record holds its diagnostics.
    fn train_step(&mut self, step: &Step<E>) -> Result<Option<Record>>;

    /// Save the parameters of the agent in the given directory.
    ///
    /// The directory holds everything needed to reconstruct the agent,
    /// hyperparameters included.
    fn save_params(&self, path: &Path) -> Result<()>;

    /// Load the parameters of the agent from the given directory.
    fn load_params(&mut self, path: &Path) -> Result<()>;
}

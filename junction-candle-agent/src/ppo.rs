//! Proximal policy optimization (PPO) for discrete actions.
//!
//! The agent is made of four pieces:
//!
//! * [`TransitionBuffer`] stores the transitions collected since the last update.
//! * [`ActorCritic`] is the policy and value network with a shared trunk.
//! * [`AdvantageEstimator`] computes GAE-λ advantages and return targets.
//! * [`PpoOptimizer`] runs the epochs of the clipped surrogate objective.
//!
//! [`Ppo`] puts them behind [`junction_core::Agent`].
//!
//! ```no_run
//! # use junction_candle_agent::ppo::{ActorCriticConfig, PpoConfig};
//! # use junction_core::OptInterval;
//! let config = PpoConfig::default()
//!     .model_config(ActorCriticConfig::default().obs_dim(12).n_actions(4))
//!     .learning_rate(3e-4)
//!     .opt_interval(OptInterval::Episodes(1))
//!     .seed(42);
//! config.save("ppo.yaml").unwrap();
//! ```
mod base;
mod buffer;
mod config;
mod error;
mod gae;
mod model;
mod optimizer;
pub use base::Ppo;
pub use buffer::{Trajectory, Transition, TransitionBuffer};
pub use config::PpoConfig;
pub use error::PpoError;
pub use gae::AdvantageEstimator;
pub use model::{ActorCritic, ActorCriticConfig};
pub use optimizer::{clipped_surrogate, PpoOptimizer};

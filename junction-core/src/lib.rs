#![warn(missing_docs)]
//! Core traits and types shared by the traffic-signal control agents.
//!
//! This crate is backend independent. It defines the contract between an
//! environment (for example a SUMO-backed intersection) and a learning
//! algorithm:
//!
//! * [`Env`] produces observations and [`Step`] objects from actions.
//! * [`Policy`] maps an observation to an action.
//! * [`Agent`] is the capability contract every algorithm variant implements:
//!   `reset`, `sample` (select an action), `train_step`, `save_params` and
//!   `load_params`.
//!
//! The concrete learning algorithms live in backend crates, such as
//! `junction-candle-agent`.
pub mod error;
pub mod record;

mod base;
pub use base::{
    Act, Agent, Configurable, Env, ExperienceBufferBase, Info, Obs, OptInterval,
    OptIntervalCounter, Policy, Step,
};

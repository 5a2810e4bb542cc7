//! Core functionalities.
mod agent;
mod env;
mod opt_interval;
mod policy;
mod replay_buffer;
mod step;
pub use agent::Agent;
pub use env::Env;
pub use opt_interval::{OptInterval, OptIntervalCounter};
pub use policy::{Configurable, Policy};
pub use replay_buffer::ExperienceBufferBase;
use std::fmt::Debug;
pub use step::{Info, Step};

/// An observation of an environment.
///
/// Observations of the traffic environments are fixed-size numeric vectors
/// (queue lengths, phase indicators, elapsed green time and so on), but the
/// trait itself does not assume a representation. Backends put conversion
/// bounds on it, e.g. `Into<Vec<f32>>`.
pub trait Obs: Clone + Debug {}

/// An action of an environment.
pub trait Act: Clone + Debug {}

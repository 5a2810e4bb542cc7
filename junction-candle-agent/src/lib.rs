//! Traffic-signal control agents implemented with [candle](https://crates.io/crates/candle-core).
//!
//! The main item is the [`Ppo`](ppo::Ppo) agent, an on-policy actor-critic
//! trained with the clipped surrogate objective and generalized advantage
//! estimation. It implements [`junction_core::Agent`], so an experiment runner
//! can drive it through the same loop as any other algorithm variant.
pub mod mlp;
pub mod model;
pub mod opt;
pub mod ppo;
pub mod util;
use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Copy, Deserialize, Serialize, PartialEq, Default)]
/// Device for using candle.
///
/// This enum is added because [`candle_core::Device`] does not support serialization.
pub enum Device {
    /// The main CPU device.
    #[default]
    Cpu,

    /// The GPU device with the given ordinal.
    Cuda(usize),
}

impl Device {
    /// Returns the corresponding [`candle_core::Device`].
    ///
    /// Fails if a CUDA device is requested and candle was built without CUDA support.
    pub fn to_candle(self) -> Result<candle_core::Device> {
        match self {
            Self::Cpu => Ok(candle_core::Device::Cpu),
            Self::Cuda(n) => Ok(candle_core::Device::new_cuda(n)?),
        }
    }
}

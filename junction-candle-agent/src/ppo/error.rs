//! Errors of the PPO agent.
use thiserror::Error;

/// Errors raised by the PPO components.
///
/// Functions of this module return [`anyhow::Result`]; callers that need to
/// branch on the failure downcast with `err.downcast_ref::<PpoError>()`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PpoError {
    /// An invalid hyperparameter, detected at construction.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// `update()` was called with no transition in the buffer.
    ///
    /// Recoverable, the caller may skip the update.
    #[error("Update on an empty trajectory")]
    EmptyTrajectory,

    /// The parallel sequences of a trajectory disagree in length, or the
    /// stored states disagree in dimension.
    #[error("Trajectory shape mismatch: {0}")]
    ShapeMismatch(String),

    /// A non-finite loss or action distribution.
    #[error("Numeric divergence: {0}")]
    NumericDivergence(String),

    /// `train_step()` was called without an action sampled in training mode.
    #[error("No pending action; call sample() in training mode before train_step()")]
    NoPendingAction,
}

//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug, PartialEq)]
pub enum JunctionError {
    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),

    /// An optimization interval of zero steps or episodes.
    #[error("Optimization interval must be positive, got {0:?}")]
    InvalidOptInterval(String),
}

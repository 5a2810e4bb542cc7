//! Types for recording training metrics.
//!
//! Agents return a [`Record`] from every optimization step. An experiment
//! runner decides what to do with it (printing, writing JSON, TensorBoard).
//!
//! ```rust
//! use junction_core::record::{Record, RecordValue};
//!
//! let mut record = Record::from_scalar("loss_actor", 0.25);
//! record.insert("queue_lengths", RecordValue::Array1(vec![3.0, 0.0, 1.0, 4.0]));
//! assert_eq!(record.get_scalar("loss_actor").unwrap(), 0.25);
//! ```
mod base;

pub use base::{Record, RecordValue};

//! Error types for the Tally engine.
//!
//! The engine has no fatal states: loading normalizes malformed data and
//! mutations on unknown ids are no-ops. Errors exist only at the storage
//! write boundary, and the store absorbs those too (see
//! [`CounterStore::persistence_degraded`](crate::CounterStore::persistence_degraded)).

use thiserror::Error;

/// All possible errors from the Tally engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("storage write failed for key '{key}': {reason}")]
    WriteFailed { key: String, reason: String },

    #[error("could not encode value for key '{key}': {reason}")]
    Encode { key: String, reason: String },
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

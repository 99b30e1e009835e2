//! Storage error types.
//!
//! Absence is never an error here: a missing or expired key is reported as
//! `Ok(None)` / `Ok(false)` by the operations that can observe it.

/// Errors raised by the cache backend or while materializing stored records.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The backing store could not be reached.
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    /// A backend adapter failed while executing an operation.
    #[error("Cache backend error: {0:#}")]
    Backend(#[from] anyhow::Error),

    /// A stored value exists but does not describe a well-formed record.
    #[error("Corrupt value at '{key}': {reason}")]
    Corrupt {
        /// Full cache key of the offending value.
        key: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A record could not be serialized or deserialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A write was refused because the key is already live.
    #[error("Key already exists: {0}")]
    KeyExists(String),

    /// A key component was empty or otherwise unusable.
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// A value was rejected before being written.
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

/// Result alias used across the crate.
pub type StorageResult<T> = Result<T, StorageError>;

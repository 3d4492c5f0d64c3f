//! Error types and result types for store operations.
//!
//! The taxonomy is deliberately small: callers of the type-scoped store only
//! need to distinguish a missing document from a backend failure, and both of
//! those from a fatal configuration problem. Use [`StoreResult<T>`] as the
//! return type for fallible operations.

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors that can occur when interacting with the store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Fatal configuration error: initial dial failure or index bootstrap
    /// failure. The store cannot serve any request against the affected
    /// connection; this is never retried automatically.
    #[error("Configuration error: {0}")]
    Config(String),
    /// Per-operation failure in the underlying storage backend (network,
    /// constraint violation). Surfaced to the caller, not retried here.
    #[error("Backend error: {0}")]
    Backend(String),
    /// The targeted document does not exist in its partition. Surfaced
    /// distinctly from [`StoreError::Backend`] so callers can render a
    /// 404-equivalent instead of a 500-equivalent.
    #[error("Document {0} not found in partition {1}")]
    NotFound(String, String),
    /// Serialization/deserialization error when converting document values.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Failure to hand a change message to the notification transport.
    /// Logged by the dispatcher, never propagated to the triggering request,
    /// and never rolls back the already-committed storage mutation.
    #[error("Notification dispatch error: {0}")]
    Dispatch(String),
}

/// A specialized `Result` type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl From<BsonError> for StoreError {
    fn from(err: BsonError) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for StoreError {
    fn from(err: SerdeJsonError) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

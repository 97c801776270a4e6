//! Sync engine error types.

use database::DatabaseError;
use thiserror::Error;

/// Errors that can occur during synchronization operations.
///
/// Validation and not-found failures are distinct so callers can tell
/// "bad input" from "stale reference". Anything else from the store is
/// a transient failure; retries are the caller's responsibility, and
/// re-issuing an ingest or status update is always safe.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A required field is missing from the candidate record.
    /// Nothing was persisted.
    #[error("missing required field: {field}")]
    Validation { field: &'static str },

    /// The operation targets an `id` that is not stored. No state change.
    #[error("message not found: {id}")]
    NotFound { id: String },

    /// Underlying persistence failure, propagated as-is.
    #[error("store error: {0}")]
    Store(DatabaseError),
}

impl From<DatabaseError> for SyncError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { id, .. } => SyncError::NotFound { id },
            other => SyncError::Store(other),
        }
    }
}

/// Result type for synchronization operations.
pub type Result<T> = std::result::Result<T, SyncError>;

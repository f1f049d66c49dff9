//! Synchronizer error types.

use exercise_result_log::ResultLogError;
use practice_config_and_utils::CoreError;
use practice_kv_storage::StorageError;
use professional_remote::RemoteError;
use sync_outbox::OutboxError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    /// The local medium failed. The operation did not complete.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Malformed input. Never retried.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The professional is confirmed not to exist.
    #[error("Professional {0} does not exist")]
    InvalidTarget(String),

    /// Existence of the professional could not be verified.
    #[error("Could not verify professional {0}")]
    RemoteUnavailable(String),

    /// The trial write during connect was rejected or did not arrive.
    #[error("Trial write to professional {0} failed")]
    TrialWriteFailed(String),

    /// Setup of the production stack failed.
    #[error("Configuration error: {0}")]
    Config(#[from] CoreError),

    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),
}

impl From<ResultLogError> for SyncError {
    fn from(err: ResultLogError) -> Self {
        match err {
            ResultLogError::Storage(e) => Self::Storage(e),
            ResultLogError::Validation(msg) => Self::Validation(msg),
        }
    }
}

impl From<OutboxError> for SyncError {
    fn from(err: OutboxError) -> Self {
        match err {
            OutboxError::Storage(e) => Self::Storage(e),
            OutboxError::InvalidEntry(msg) => Self::Validation(msg),
        }
    }
}

pub type SyncResult<T> = Result<T, SyncError>;

//! Outbox error types.

use exercise_result_log::ResultLogError;
use practice_kv_storage::StorageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutboxError {
    /// The durable medium failed
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Delivery cannot be queued as given
    #[error("Invalid entry: {0}")]
    InvalidEntry(String),
}

impl From<ResultLogError> for OutboxError {
    fn from(err: ResultLogError) -> Self {
        match err {
            ResultLogError::Storage(e) => OutboxError::Storage(e),
            ResultLogError::Validation(msg) => OutboxError::InvalidEntry(msg),
        }
    }
}

pub type OutboxResult<T> = Result<T, OutboxError>;

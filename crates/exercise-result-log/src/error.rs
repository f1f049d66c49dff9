//! Result log error types.

use practice_kv_storage::StorageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResultLogError {
    /// The durable medium failed
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Malformed input, never retried
    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<serde_json::Error> for ResultLogError {
    fn from(err: serde_json::Error) -> Self {
        Self::Storage(StorageError::Json(err))
    }
}

pub type ResultLogResult<T> = Result<T, ResultLogError>;

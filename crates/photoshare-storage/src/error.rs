//! Storage service error types.

use photoshare_core::error::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    /// Ownership validation failed or the tenant is deactivated.
    #[error("storage access denied: {0}")]
    PermissionDenied(String),

    #[error("validation error: {0}")]
    Validation(String),

    /// A key or filename that does not survive sanitization.
    #[error("invalid storage path: {0}")]
    InvalidPath(String),

    /// Underlying store failure, already retried where transient. The
    /// wrapped text is for operators; clients get a generic message.
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<StorageError> for CoreError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::PermissionDenied(reason) => CoreError::PermissionDenied { reason },
            StorageError::Validation(message) | StorageError::InvalidPath(message) => {
                CoreError::Validation { message }
            }
            StorageError::Backend(msg) => CoreError::Storage(msg),
        }
    }
}

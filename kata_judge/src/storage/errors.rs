//! Storage error types.

use std::time::Duration;
use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored document could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Key is empty or contains characters the engine cannot address
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    /// Engine did not answer in time
    #[error("Storage operation timed out after {0:?}")]
    Timeout(Duration),
}

impl StorageError {
    /// Get a client-safe error message that doesn't leak engine details
    pub fn client_message(&self) -> String {
        match self {
            StorageError::InvalidKey(_) => self.to_string(),
            _ => "Internal server error".to_string(),
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

//! Registry error types.

use crate::storage::StorageError;
use thiserror::Error;

/// Judge and athlete registry errors
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Record rejected before anything was stored
    #[error("Validation error: {0}")]
    Validation(String),

    /// Every drawn id was already taken
    #[error("No unused id found after {attempts} attempts")]
    IdsExhausted { attempts: usize },

    /// Storage engine failure
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Stored record could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RegistryError {
    /// Get a client-safe error message that doesn't leak storage internals
    pub fn client_message(&self) -> String {
        match self {
            RegistryError::Validation(_) | RegistryError::IdsExhausted { .. } => self.to_string(),
            RegistryError::Storage(e) => e.client_message(),
            RegistryError::Serialization(_) => "Internal server error".to_string(),
        }
    }
}

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_is_exposed() {
        let err = RegistryError::Validation("name is required".to_string());
        assert_eq!(err.client_message(), "Validation error: name is required");
    }

    #[test]
    fn test_storage_message_is_sanitized() {
        let io = std::io::Error::other("/var/lib/kata/judge/x.json: permission denied");
        let err = RegistryError::Storage(StorageError::Io(io));
        assert_eq!(err.client_message(), "Internal server error");
    }
}

//! Storage error types

use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization error
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Database error
    #[error("database error: {0}")]
    Database(String),
}

/// Result type for storage operations
pub type Result<T> = std::result::Result<T, StorageError>;

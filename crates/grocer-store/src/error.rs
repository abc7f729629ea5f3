//! Storage error types.

use thiserror::Error;

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur when reading or writing storage.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the store.
    #[error("Failed to open store: {0}")]
    OpenError(String),

    /// No document with this id exists in the collection.
    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    /// A conditional update found a different field value.
    #[error("Precondition failed on {collection}/{id}: {field} is {actual}, expected {expected}")]
    PreconditionFailed {
        collection: String,
        id: String,
        field: String,
        expected: String,
        actual: String,
    },

    /// Document bodies must be JSON objects.
    #[error("Document body for {0} is not a JSON object")]
    NotAnObject(String),

    /// Key contains characters that cannot be stored.
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    /// Failed to serialize or deserialize a value.
    #[error("Serialization error: {0}")]
    SerializeError(#[from] serde_json::Error),

    /// Underlying file operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

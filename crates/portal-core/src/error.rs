use thiserror::Error;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Debug, Clone, Error)]
pub enum CoreError {
    #[error("invalid short code: {0}")]
    InvalidShortCode(String),
}

/// Errors surfaced by [`UrlStorage`](crate::UrlStorage) implementations.
///
/// A missing or expired code is not an error; it is reported through
/// [`Lookup`](crate::Lookup).
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("storage query failed: {0}")]
    Query(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
    #[error("invalid storage configuration: {0}")]
    Configuration(String),
    #[error("no free short code after {attempts} attempts")]
    Exhausted { attempts: usize },
    #[error("storage operation failed: {0}")]
    Operation(String),
}

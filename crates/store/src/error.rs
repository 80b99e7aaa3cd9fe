//! Error types for the bucket store.

use crate::registry::RegistryError;

/// Errors that can occur when working with the bucket store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Object key rejected before any I/O was attempted
    #[error("invalid object key: {0}")]
    InvalidKey(String),

    /// No bucket registered under the given name
    #[error("bucket not found: {0}")]
    BucketNotFound(String),

    /// Remote backend error other than not-found, surfaced unchanged
    #[error("remote backend error: {0}")]
    Remote(#[from] object_store::Error),

    /// Local disk error (cache lookup or population)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Bucket registry error
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Invalid backend configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for bucket store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

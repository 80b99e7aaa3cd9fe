//! Bucket registry contract.
//!
//! The engine resolves bucket names through this interface and never touches
//! the persistence layer behind it. Implementations live with whatever owns
//! the bucket records (the service crate ships a SQLite-backed one).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A named, owned namespace of keyed objects.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    /// Globally unique human-readable name
    pub name: String,
    /// Identity that owns (and may mutate) the bucket
    pub owner_id: Uuid,
    /// Whether unauthenticated reads are permitted
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Errors surfaced by a registry implementation.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The registry's backing store failed
    #[error("registry backend error: {0}")]
    Backend(String),
}

/// Resolves a bucket name to its identity record.
#[async_trait]
pub trait BucketRegistry: Send + Sync {
    /// Look up a bucket by name. `None` when no bucket is registered under
    /// the name.
    async fn resolve(&self, name: &str) -> Result<Option<Bucket>, RegistryError>;
}

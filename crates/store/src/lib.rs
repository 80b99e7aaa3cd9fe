//! Bucket Storage Engine
//!
//! This crate provides namespaced blob storage over a remote object store
//! (S3/MinIO/local filesystem/memory) with a local disk cache as a read
//! accelerator.
//!
//! # Semantics
//!
//! - Reads are read-through: disk cache first, remote on miss, best-effort
//!   cache population afterwards
//! - Writes are write-through: straight to the remote, never touching the
//!   cache (a pre-existing entry serves stale bytes by contract)
//! - Listings are prefix-scoped, delimiter-grouped, and marker-paginated,
//!   with synthetic directory entries for the backend's common prefixes
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use store::{BackendConfig, BucketStore, DiskCache, ObjectStoreBackend};
//!
//! # async fn example(registry: Arc<dyn store::BucketRegistry>) -> store::Result<()> {
//! let backend = Arc::new(ObjectStoreBackend::new(BackendConfig::Memory).await?);
//! let store = BucketStore::new(registry, backend, DiskCache::new("/var/cache/hangar"));
//!
//! let blob = store.read("my-bucket", "photos/cat.png").await?;
//! # Ok(())
//! # }
//! ```

mod backend;
mod cache;
mod engine;
mod error;
mod registry;

pub use backend::{
    BackendConfig, ListPage, ObjectStoreBackend, RemoteBackend, RemoteObject, MAX_LIST_KEYS,
};
pub use cache::DiskCache;
pub use engine::{BucketStore, Listing, ObjectEntry};
pub use error::{Result, StoreError};
pub use registry::{Bucket, BucketRegistry, RegistryError};

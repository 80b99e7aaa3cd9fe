//! Remote object backend abstraction (S3/MinIO/local filesystem/memory).

use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// Upper bound on entries (objects plus common prefixes) in one listing page.
pub const MAX_LIST_KEYS: usize = 1000;

/// Configuration for the remote object backend.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BackendConfig {
    /// In-memory storage (for testing)
    #[default]
    Memory,

    /// Local filesystem storage
    Local {
        /// Path to the storage directory
        path: PathBuf,
    },

    /// S3-compatible storage (AWS S3, MinIO, etc.)
    S3 {
        /// S3 endpoint URL (e.g., "http://localhost:9000" for MinIO)
        endpoint: String,
        /// Access key ID
        access_key: String,
        /// Secret access key
        secret_key: String,
        /// Bucket name
        bucket: String,
        /// Optional region (defaults to "us-east-1")
        region: Option<String>,
    },
}

/// A direct object entry on one listing page.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteObject {
    /// Backend-absolute key, e.g. `my-bucket/photos/cat.png`
    pub key: String,
    /// Object size in bytes
    pub size: u64,
    /// Last modification time reported by the backend
    pub last_modified: DateTime<Utc>,
}

/// One page of a prefix-scoped, delimiter-grouped remote listing.
#[derive(Debug, Clone, Default)]
pub struct ListPage {
    /// Direct objects under the prefix
    pub objects: Vec<RemoteObject>,
    /// Key groups one delimiter level below the prefix, trailing `/` included
    pub common_prefixes: Vec<String>,
    /// Marker for the next page, absent when the listing is exhausted
    pub next_cursor: Option<String>,
}

/// Thin get/put/list client for a remote object store, keyed by
/// backend-absolute (bucket-qualified) keys.
///
/// A single shared instance serves all engine calls; tests substitute
/// doubles behind the trait.
#[async_trait]
pub trait RemoteBackend: Send + Sync + Debug {
    /// Fetch raw bytes for a key. `None` when the key does not exist
    /// remotely; any other backend error propagates unchanged.
    async fn get(&self, key: &str) -> Result<Option<Bytes>>;

    /// Upload bytes, overwriting any existing object at the key.
    async fn put(&self, key: &str, data: Bytes) -> Result<()>;

    /// Perform a single page of a prefix-scoped listing. Entries
    /// lexicographically at or before `start_after` are skipped.
    async fn list_page(&self, prefix: &str, start_after: Option<&str>) -> Result<ListPage>;
}

/// `RemoteBackend` over the `object_store` crate.
#[derive(Debug, Clone)]
pub struct ObjectStoreBackend {
    inner: Arc<dyn ObjectStore>,
}

impl ObjectStoreBackend {
    /// Create a new backend from configuration.
    pub async fn new(config: BackendConfig) -> Result<Self> {
        let inner: Arc<dyn ObjectStore> = match &config {
            BackendConfig::Memory => Arc::new(InMemory::new()),

            BackendConfig::Local { path } => {
                // Ensure directory exists
                tokio::fs::create_dir_all(path).await?;
                Arc::new(
                    LocalFileSystem::new_with_prefix(path)
                        .map_err(|e| StoreError::InvalidConfig(e.to_string()))?,
                )
            }

            BackendConfig::S3 {
                endpoint,
                access_key,
                secret_key,
                bucket,
                region,
            } => {
                let builder = AmazonS3Builder::new()
                    .with_endpoint(endpoint)
                    .with_access_key_id(access_key)
                    .with_secret_access_key(secret_key)
                    .with_bucket_name(bucket)
                    .with_region(region.as_deref().unwrap_or("us-east-1"))
                    .with_allow_http(endpoint.starts_with("http://"));

                let store: Arc<dyn ObjectStore> = Arc::new(
                    builder
                        .build()
                        .map_err(|e| StoreError::InvalidConfig(e.to_string()))?,
                );

                // Verify the underlying S3 bucket exists by listing (empty
                // prefix). This fails fast at startup instead of on the
                // first request.
                {
                    use futures::TryStreamExt;
                    let prefix = ObjectPath::from("");
                    let mut stream = store.list(Some(&prefix));
                    match stream.try_next().await {
                        Ok(_) => {}
                        Err(object_store::Error::NotFound { .. }) => {
                            return Err(StoreError::InvalidConfig(format!(
                                "S3 bucket '{}' does not exist",
                                bucket
                            )));
                        }
                        Err(e) => return Err(e.into()),
                    }
                }

                store
            }
        };

        Ok(Self { inner })
    }
}

/// Listing entry tagged with its kind, ordered by key.
enum PageEntry {
    Object(RemoteObject),
    CommonPrefix(String),
}

impl PageEntry {
    fn sort_key(&self) -> &str {
        match self {
            PageEntry::Object(obj) => &obj.key,
            PageEntry::CommonPrefix(p) => p,
        }
    }
}

#[async_trait]
impl RemoteBackend for ObjectStoreBackend {
    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        let path = ObjectPath::from(key);
        match self.inner.get(&path).await {
            Ok(result) => {
                let bytes = result.bytes().await?;
                Ok(Some(bytes))
            }
            Err(object_store::Error::NotFound { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, key: &str, data: Bytes) -> Result<()> {
        let path = ObjectPath::from(key);
        self.inner.put(&path, data.into()).await?;
        Ok(())
    }

    async fn list_page(&self, prefix: &str, start_after: Option<&str>) -> Result<ListPage> {
        let prefix_path = ObjectPath::from(prefix);
        let listing = self.inner.list_with_delimiter(Some(&prefix_path)).await?;

        // Reduce the delimiter listing to one marker-delimited page:
        // objects and common prefixes interleaved in lexicographic key
        // order, entries strictly greater than the marker, capped at
        // MAX_LIST_KEYS.
        let mut entries: Vec<PageEntry> =
            Vec::with_capacity(listing.objects.len() + listing.common_prefixes.len());
        for meta in listing.objects {
            entries.push(PageEntry::Object(RemoteObject {
                key: meta.location.as_ref().to_string(),
                size: meta.size as u64,
                last_modified: meta.last_modified,
            }));
        }
        for p in listing.common_prefixes {
            entries.push(PageEntry::CommonPrefix(format!("{}/", p.as_ref())));
        }
        entries.sort_by(|a, b| a.sort_key().cmp(b.sort_key()));
        if let Some(marker) = start_after {
            entries.retain(|e| e.sort_key() > marker);
        }

        let next_cursor = if entries.len() > MAX_LIST_KEYS {
            entries.truncate(MAX_LIST_KEYS);
            entries.last().map(|e| e.sort_key().to_string())
        } else {
            None
        };

        let mut page = ListPage {
            next_cursor,
            ..Default::default()
        };
        for entry in entries {
            match entry {
                PageEntry::Object(obj) => page.objects.push(obj),
                PageEntry::CommonPrefix(p) => page.common_prefixes.push(p),
            }
        }
        Ok(page)
    }
}

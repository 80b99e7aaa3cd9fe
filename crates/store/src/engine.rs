//! Bucket storage engine.
//!
//! Orchestrates read-through caching, write-through writes, and
//! delimiter-grouped listings. Reads consult the disk cache before the
//! remote backend and populate it best-effort on miss; writes go straight
//! to the remote and deliberately leave the cache alone; listings reconcile
//! the backend's flat key space with a directory-like view.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::backend::RemoteBackend;
use crate::cache::DiskCache;
use crate::error::{Result, StoreError};
use crate::registry::{Bucket, BucketRegistry};

/// One externally visible listing entry. Directory entries are synthesized
/// from the backend's common prefixes and carry no content or timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectEntry {
    pub name: String,
    pub size: u64,
    pub is_directory: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

/// One page of a bucket listing. `next_cursor` is bucket-relative and opaque
/// to callers; it is absent when the listing is exhausted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub entries: Vec<ObjectEntry>,
    pub next_cursor: Option<String>,
}

/// Storage engine for namespaced blob access. One instance is shared across
/// all requests; the registry and backend are injected behind traits.
pub struct BucketStore {
    registry: Arc<dyn BucketRegistry>,
    backend: Arc<dyn RemoteBackend>,
    cache: DiskCache,
}

impl BucketStore {
    pub fn new(
        registry: Arc<dyn BucketRegistry>,
        backend: Arc<dyn RemoteBackend>,
        cache: DiskCache,
    ) -> Self {
        Self {
            registry,
            backend,
            cache,
        }
    }

    async fn resolve(&self, name: &str) -> Result<Bucket> {
        self.registry
            .resolve(name)
            .await?
            .ok_or_else(|| StoreError::BucketNotFound(name.to_string()))
    }

    /// Read an object. `None` when the key does not exist remotely, which
    /// callers map to a not-found response rather than a server error.
    pub async fn read(&self, bucket: &str, key: &str) -> Result<Option<Bytes>> {
        validate_key(key)?;
        let bucket = self.resolve(bucket).await?;

        // Fast path: cached bytes are returned verbatim, no network I/O.
        if let Some(data) = self.cache.lookup(&bucket.name, key).await? {
            tracing::debug!(bucket = %bucket.name, key, "cache hit");
            return Ok(Some(data));
        }

        let Some(data) = self.backend.get(&remote_key(&bucket.name, key)).await? else {
            return Ok(None);
        };

        // Best-effort population: a cache failure must not fail the read.
        // Racing misses may both land here; they write identical bytes, so
        // last-writer-wins keeps the cache correct.
        if let Err(e) = self.cache.store(&bucket.name, key, &data).await {
            tracing::warn!(bucket = %bucket.name, key, error = %e, "failed to populate disk cache");
        }

        Ok(Some(data))
    }

    /// Write an object straight to the remote backend, bucket-scoped like
    /// reads. The cache is not updated or invalidated: an existing entry
    /// keeps serving the old bytes until cleared externally, a documented
    /// staleness window. No retries; a single remote failure surfaces.
    pub async fn write(&self, bucket: &str, key: &str, data: Bytes) -> Result<()> {
        validate_key(key)?;
        let bucket = self.resolve(bucket).await?;
        self.backend.put(&remote_key(&bucket.name, key), data).await
    }

    /// List one page of bucket contents, optionally below a prefix.
    /// `cursor` is the bucket-relative marker from a previous page.
    pub async fn list(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        cursor: Option<&str>,
    ) -> Result<Listing> {
        let bucket = self.resolve(bucket).await?;
        let scope = format!("{}/", bucket.name);

        // The trailing delimiter is mandatory so the backend groups
        // siblings of the prefix rather than keys that merely share a
        // leading string.
        let remote_prefix = match prefix {
            Some(p) if !p.trim_matches('/').is_empty() => {
                format!("{}{}/", scope, p.trim_matches('/'))
            }
            _ => scope.clone(),
        };
        // External cursors are bucket-relative; the backend wants them
        // absolute.
        let remote_cursor = cursor.map(|c| format!("{}{}", scope, c));

        let page = self
            .backend
            .list_page(&remote_prefix, remote_cursor.as_deref())
            .await?;

        // Size-0 objects are folder placeholder markers left behind by
        // remote tooling, not content.
        let files = page
            .objects
            .into_iter()
            .filter(|o| o.size != 0)
            .filter_map(|o| {
                o.key.strip_prefix(&scope).map(|name| ObjectEntry {
                    name: name.to_string(),
                    size: o.size,
                    is_directory: false,
                    updated_at: Some(o.last_modified),
                })
            });
        let directories = page.common_prefixes.into_iter().filter_map(|p| {
            p.strip_prefix(&scope).map(|name| ObjectEntry {
                name: name.to_string(),
                size: 0,
                is_directory: true,
                updated_at: None,
            })
        });

        // Objects first, then synthesized directories.
        let entries = files.chain(directories).collect();
        let next_cursor = page
            .next_cursor
            .and_then(|c| c.strip_prefix(&scope).map(str::to_string));

        Ok(Listing {
            entries,
            next_cursor,
        })
    }
}

fn remote_key(bucket: &str, key: &str) -> String {
    format!("{}/{}", bucket, key)
}

/// Keys are rejected before any I/O is attempted.
fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(StoreError::InvalidKey("key must not be empty".to_string()));
    }
    if key.starts_with('/') {
        return Err(StoreError::InvalidKey(format!(
            "key must not start with '/': {}",
            key
        )));
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bytes::Bytes;

    use super::testkit::StaticRegistry;
    use super::*;
    use crate::backend::{BackendConfig, ObjectStoreBackend};

    async fn engine_for(bucket: &str) -> (BucketStore, Arc<ObjectStoreBackend>, tempfile::TempDir) {
        let backend = Arc::new(
            ObjectStoreBackend::new(BackendConfig::Memory)
                .await
                .unwrap(),
        );
        let cache_dir = tempfile::tempdir().unwrap();
        let store = BucketStore::new(
            Arc::new(StaticRegistry::with_bucket(bucket)),
            backend.clone(),
            DiskCache::new(cache_dir.path()),
        );
        (store, backend, cache_dir)
    }

    #[tokio::test]
    async fn test_read_missing_key_is_none_not_error() {
        let (store, _, _cache_dir) = engine_for("b").await;
        assert!(store.read("b", "nope.txt").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_bucket_is_an_error() {
        let (store, _, _cache_dir) = engine_for("b").await;
        let err = store.read("ghost", "x").await.unwrap_err();
        assert!(matches!(err, StoreError::BucketNotFound(name) if name == "ghost"));
    }

    #[tokio::test]
    async fn test_invalid_keys_rejected_before_io() {
        let (store, _, _cache_dir) = engine_for("b").await;

        let err = store.read("b", "").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidKey(_)));

        let err = store
            .write("b", "/absolute", Bytes::from("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidKey(_)));
    }

    #[tokio::test]
    async fn test_write_is_bucket_scoped() {
        let (store, backend, _cache_dir) = engine_for("b").await;

        store.write("b", "dir/file.txt", Bytes::from("payload")).await.unwrap();

        // The remote key carries the bucket prefix, symmetric with reads.
        let remote = backend.get("b/dir/file.txt").await.unwrap().unwrap();
        assert_eq!(remote, Bytes::from("payload"));
    }

    #[tokio::test]
    async fn test_write_does_not_touch_cache() {
        let (store, _, _cache_dir) = engine_for("b").await;

        store.write("b", "k.txt", Bytes::from("old")).await.unwrap();
        // Populate the cache via a read.
        assert_eq!(
            store.read("b", "k.txt").await.unwrap().unwrap(),
            Bytes::from("old")
        );

        // Overwrite remotely; the cache entry stays and keeps serving the
        // old bytes. This staleness window is contract, not a bug.
        store.write("b", "k.txt", Bytes::from("new")).await.unwrap();
        assert_eq!(
            store.read("b", "k.txt").await.unwrap().unwrap(),
            Bytes::from("old")
        );
    }

    #[tokio::test]
    async fn test_list_worked_example() {
        let (store, backend, _cache_dir) = engine_for("b").await;

        backend.put("b/a.txt", Bytes::from("12345")).await.unwrap();
        backend.put("b/sub/c.txt", Bytes::from("x")).await.unwrap();

        let listing = store.list("b", None, None).await.unwrap();

        assert_eq!(listing.entries.len(), 2);
        assert_eq!(listing.entries[0].name, "a.txt");
        assert_eq!(listing.entries[0].size, 5);
        assert!(!listing.entries[0].is_directory);
        assert!(listing.entries[0].updated_at.is_some());

        assert_eq!(listing.entries[1].name, "sub/");
        assert_eq!(listing.entries[1].size, 0);
        assert!(listing.entries[1].is_directory);
        assert!(listing.entries[1].updated_at.is_none());

        assert!(listing.next_cursor.is_none());
    }

    #[tokio::test]
    async fn test_list_excludes_folder_placeholders() {
        let (store, backend, _cache_dir) = engine_for("b").await;

        backend.put("b/real.txt", Bytes::from("data")).await.unwrap();
        backend.put("b/placeholder", Bytes::new()).await.unwrap();

        let listing = store.list("b", None, None).await.unwrap();

        let names: Vec<&str> = listing.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["real.txt"]);
    }

    #[tokio::test]
    async fn test_list_below_prefix() {
        let (store, backend, _cache_dir) = engine_for("b").await;

        backend.put("b/top.txt", Bytes::from("t")).await.unwrap();
        backend.put("b/photos/cat.png", Bytes::from("img")).await.unwrap();
        backend
            .put("b/photos/archive/old.png", Bytes::from("img"))
            .await
            .unwrap();

        let listing = store.list("b", Some("photos"), None).await.unwrap();

        let names: Vec<&str> = listing.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["photos/cat.png", "photos/archive/"]);
    }

    #[tokio::test]
    async fn test_list_cursor_is_bucket_relative() {
        let (store, backend, _cache_dir) = engine_for("b").await;

        backend.put("b/a.txt", Bytes::from("a")).await.unwrap();
        backend.put("b/b.txt", Bytes::from("b")).await.unwrap();
        backend.put("b/c.txt", Bytes::from("c")).await.unwrap();

        let listing = store.list("b", None, Some("a.txt")).await.unwrap();

        let names: Vec<&str> = listing.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["b.txt", "c.txt"]);
    }
}

//! Integration tests for the bucket store read/write/list paths.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use uuid::Uuid;

use store::{
    BackendConfig, Bucket, BucketRegistry, BucketStore, DiskCache, ListPage, ObjectStoreBackend,
    RegistryError, RemoteBackend, Result, MAX_LIST_KEYS,
};

/// Registry double resolving exactly one bucket.
#[derive(Debug)]
struct SingleBucket(Bucket);

impl SingleBucket {
    fn named(name: &str) -> Self {
        let now = Utc::now();
        Self(Bucket {
            name: name.to_string(),
            owner_id: Uuid::new_v4(),
            is_public: true,
            created_at: now,
            updated_at: now,
        })
    }
}

#[async_trait]
impl BucketRegistry for SingleBucket {
    async fn resolve(&self, name: &str) -> std::result::Result<Option<Bucket>, RegistryError> {
        Ok((name == self.0.name).then(|| self.0.clone()))
    }
}

/// Backend double that counts remote fetches.
#[derive(Debug)]
struct CountingBackend {
    inner: ObjectStoreBackend,
    gets: AtomicUsize,
}

impl CountingBackend {
    async fn new() -> Self {
        Self {
            inner: ObjectStoreBackend::new(BackendConfig::Memory)
                .await
                .unwrap(),
            gets: AtomicUsize::new(0),
        }
    }

    fn fetches(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteBackend for CountingBackend {
    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, data: Bytes) -> Result<()> {
        self.inner.put(key, data).await
    }

    async fn list_page(&self, prefix: &str, start_after: Option<&str>) -> Result<ListPage> {
        self.inner.list_page(prefix, start_after).await
    }
}

fn engine(backend: Arc<CountingBackend>, cache_root: &std::path::Path) -> BucketStore {
    BucketStore::new(
        Arc::new(SingleBucket::named("b")),
        backend,
        DiskCache::new(cache_root),
    )
}

#[tokio::test]
async fn test_first_read_fetches_second_read_hits_cache() {
    let backend = Arc::new(CountingBackend::new().await);
    let cache_dir = tempfile::tempdir().unwrap();
    let store = engine(backend.clone(), cache_dir.path());

    backend.put("b/k.txt", Bytes::from("payload")).await.unwrap();

    let first = store.read("b", "k.txt").await.unwrap().unwrap();
    assert_eq!(first, Bytes::from("payload"));
    assert_eq!(backend.fetches(), 1);

    let second = store.read("b", "k.txt").await.unwrap().unwrap();
    assert_eq!(second, Bytes::from("payload"));
    assert_eq!(backend.fetches(), 1, "second read must not touch the remote");
}

#[tokio::test]
async fn test_write_then_read_roundtrip_with_cache_cleared() {
    let backend = Arc::new(CountingBackend::new().await);
    let cache_dir = tempfile::tempdir().unwrap();
    let store = engine(backend.clone(), cache_dir.path());

    let blob = Bytes::from_static(b"\x89PNG\r\n\x1a\nrest-of-image");
    store.write("b", "img/pix.png", blob.clone()).await.unwrap();

    // Make the read provably cache-bypassing.
    let bucket_cache = cache_dir.path().join("b");
    if bucket_cache.exists() {
        std::fs::remove_dir_all(&bucket_cache).unwrap();
    }

    let read_back = store.read("b", "img/pix.png").await.unwrap().unwrap();
    assert_eq!(read_back, blob);
}

#[tokio::test]
async fn test_concurrent_misses_both_succeed_and_cache_is_readable() {
    let backend = Arc::new(CountingBackend::new().await);
    let cache_dir = tempfile::tempdir().unwrap();
    let store = Arc::new(engine(backend.clone(), cache_dir.path()));

    backend.put("b/hot.bin", Bytes::from("hot data")).await.unwrap();

    let a = tokio::spawn({
        let store = store.clone();
        async move { store.read("b", "hot.bin").await }
    });
    let b = tokio::spawn({
        let store = store.clone();
        async move { store.read("b", "hot.bin").await }
    });

    let (a, b) = (a.await.unwrap().unwrap(), b.await.unwrap().unwrap());
    assert_eq!(a.unwrap(), Bytes::from("hot data"));
    assert_eq!(b.unwrap(), Bytes::from("hot data"));

    // Racing populators may have double-fetched; either way the cache must
    // now serve without the remote.
    let before = backend.fetches();
    let again = store.read("b", "hot.bin").await.unwrap().unwrap();
    assert_eq!(again, Bytes::from("hot data"));
    assert_eq!(backend.fetches(), before);
}

#[cfg(unix)]
#[tokio::test]
async fn test_cache_population_failure_still_returns_blob() {
    use std::os::unix::fs::PermissionsExt;

    let backend = Arc::new(CountingBackend::new().await);
    let cache_dir = tempfile::tempdir().unwrap();
    let store = engine(backend.clone(), cache_dir.path());

    backend.put("b/k.txt", Bytes::from("survives")).await.unwrap();

    // Read-only cache root makes population fail.
    std::fs::set_permissions(cache_dir.path(), std::fs::Permissions::from_mode(0o500)).unwrap();

    let blob = store.read("b", "k.txt").await.unwrap().unwrap();
    assert_eq!(blob, Bytes::from("survives"));

    // Restore so the tempdir can clean up after itself.
    std::fs::set_permissions(cache_dir.path(), std::fs::Permissions::from_mode(0o700)).unwrap();

    // Nothing was cached, so the next read fetches again.
    let before = backend.fetches();
    store.read("b", "k.txt").await.unwrap().unwrap();
    assert_eq!(backend.fetches(), before + 1);
}

#[tokio::test]
async fn test_listing_paginates_at_page_cap() {
    let backend = Arc::new(CountingBackend::new().await);
    let cache_dir = tempfile::tempdir().unwrap();
    let store = engine(backend.clone(), cache_dir.path());

    for i in 0..MAX_LIST_KEYS + 1 {
        backend
            .put(&format!("b/f{:05}", i), Bytes::from("x"))
            .await
            .unwrap();
    }

    let first = store.list("b", None, None).await.unwrap();
    assert_eq!(first.entries.len(), MAX_LIST_KEYS);
    let cursor = first.next_cursor.expect("first page must be truncated");

    let second = store.list("b", None, Some(&cursor)).await.unwrap();
    assert_eq!(second.entries.len(), 1);
    assert_eq!(second.entries[0].name, format!("f{:05}", MAX_LIST_KEYS));
    assert!(second.next_cursor.is_none());
}

//! Local disk cache for remote object content.
//!
//! Entries are a disposable projection of remote bytes, keyed by
//! (bucket name, object key). The cache is a pure read accelerator: it is
//! populated on miss, never invalidated on write, and never expired here.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use bytes::Bytes;

use crate::error::Result;

/// Owner-only directory and file modes; cached content may be sensitive.
const CACHE_DIR_MODE: u32 = 0o700;
const CACHE_FILE_MODE: u32 = 0o600;

/// Disk cache mapping (bucket, key) to a cached blob under a root directory.
#[derive(Debug, Clone)]
pub struct DiskCache {
    root: PathBuf,
}

impl DiskCache {
    /// Create a cache rooted at the given directory. The directory itself is
    /// created lazily on the first `store`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path for a cache entry. Raw keys may carry `/`, `..`, or reserved
    /// characters, so the key is encoded rather than used as a path; the
    /// URL-safe base64 alphabet keeps the encoded form free of separators.
    /// The mapping is deterministic and collision-free across distinct keys.
    pub fn entry_path(&self, bucket: &str, key: &str) -> PathBuf {
        let encoded = URL_SAFE_NO_PAD.encode(key.as_bytes());
        self.root.join(bucket).join(encoded)
    }

    /// Return cached bytes for (bucket, key) if an entry exists. Never
    /// consults the remote backend.
    pub async fn lookup(&self, bucket: &str, key: &str) -> Result<Option<Bytes>> {
        match tokio::fs::read(self.entry_path(bucket, key)).await {
            Ok(data) => Ok(Some(data.into())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Persist bytes for (bucket, key), creating the per-bucket directory if
    /// absent. Racing writers for the same entry carry identical remote
    /// content, so last-writer-wins leaves the cache correct.
    pub async fn store(&self, bucket: &str, key: &str, data: &[u8]) -> Result<()> {
        let dir = self.root.join(bucket);
        tokio::fs::create_dir_all(&dir).await?;
        restrict_mode(&dir, CACHE_DIR_MODE).await?;

        let path = self.entry_path(bucket, key);
        tokio::fs::write(&path, data).await?;
        restrict_mode(&path, CACHE_FILE_MODE).await?;
        Ok(())
    }
}

#[cfg(unix)]
async fn restrict_mode(path: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).await
}

#[cfg(not(unix))]
async fn restrict_mode(_path: &Path, _mode: u32) -> std::io::Result<()> {
    Ok(())
}

use std::sync::Arc;

use store::{BucketStore, DiskCache, ObjectStoreBackend, StoreError};

use super::config::Config;
use super::database::{Database, DatabaseError};

/// Main service state - wires the bucket registry, the shared remote
/// backend client, the disk cache and the storage engine.
#[derive(Clone)]
pub struct State {
    database: Database,
    store: Arc<BucketStore>,
}

impl State {
    pub async fn from_config(config: &Config) -> Result<Self, StateSetupError> {
        // 1. Setup database
        let database = match config.sqlite_path {
            Some(ref path) => Database::new(path).await?,
            None => Database::in_memory().await?,
        };

        // 2. Setup the remote backend client, shared by all requests
        let backend = Arc::new(ObjectStoreBackend::new(config.backend.clone()).await?);

        // 3. Setup the disk cache root
        let cache_root = match config.cache_path {
            Some(ref path) => path.clone(),
            None => tempfile::tempdir()?.into_path(),
        };
        tracing::info!(cache_root = %cache_root.display(), "disk cache root");

        // 4. Assemble the engine; the database doubles as the registry
        let store = Arc::new(BucketStore::new(
            Arc::new(database.clone()),
            backend,
            DiskCache::new(&cache_root),
        ));

        Ok(Self { database, store })
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn store(&self) -> &BucketStore {
        &self.store
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("database setup error: {0}")]
    Database(#[from] DatabaseError),
    #[error("backend setup error: {0}")]
    Backend(#[from] StoreError),
    #[error("cache setup error: {0}")]
    Cache(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_state_from_default_config() {
        let state = State::from_config(&Config::default()).await.unwrap();
        assert!(state.database().list_buckets().await.unwrap().is_empty());
    }
}

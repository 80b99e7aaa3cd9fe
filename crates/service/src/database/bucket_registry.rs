use async_trait::async_trait;

use store::{Bucket, BucketRegistry, RegistryError};

use crate::database::Database;

#[async_trait]
impl BucketRegistry for Database {
    async fn resolve(&self, name: &str) -> Result<Option<Bucket>, RegistryError> {
        self.bucket(name)
            .await
            .map_err(|e| RegistryError::Backend(e.to_string()))
    }
}

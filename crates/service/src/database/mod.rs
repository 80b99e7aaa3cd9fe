//! SQLite persistence for bucket registry records.

mod bucket_registry;

use std::path::Path;

use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions},
    Row,
};
use uuid::Uuid;

use store::Bucket;

/// Maximum accepted bucket name length.
pub const MAX_BUCKET_NAME_LEN: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// Database error
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Bucket name already taken; names are globally unique
    #[error("a bucket named '{0}' already exists")]
    DuplicateName(String),
}

/// Bucket names become cache directory names and remote key prefixes, so
/// they are restricted to a filesystem- and URL-safe alphabet.
pub fn valid_bucket_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_BUCKET_NAME_LEN
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

/// SQLite database connection pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database connection from a file path.
    pub async fn new(path: &Path) -> Result<Self, DatabaseError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    /// Create an in-memory database.
    pub async fn in_memory() -> Result<Self, DatabaseError> {
        let options = SqliteConnectOptions::new()
            .filename(":memory:")
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    /// Run database migrations.
    async fn run_migrations(&self) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Connection pool handle, used by readiness probes.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Register a new bucket. The schema's UNIQUE constraint on name backs
    /// the global uniqueness invariant; a violation maps to `DuplicateName`.
    pub async fn create_bucket(
        &self,
        name: &str,
        owner_id: Uuid,
        is_public: bool,
    ) -> Result<Bucket, DatabaseError> {
        let id = Uuid::new_v4();
        let now = Utc::now().timestamp();
        sqlx::query(
            r#"
            INSERT INTO buckets (id, name, owner_id, is_public, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(name)
        .bind(owner_id.to_string())
        .bind(is_public)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_error)
                if matches!(db_error.kind(), sqlx::error::ErrorKind::UniqueViolation) =>
            {
                DatabaseError::DuplicateName(name.to_string())
            }
            _ => DatabaseError::Sqlx(e),
        })?;

        Ok(Bucket {
            name: name.to_string(),
            owner_id,
            is_public,
            created_at: timestamp(now),
            updated_at: timestamp(now),
        })
    }

    /// Get a bucket by name.
    pub async fn bucket(&self, name: &str) -> Result<Option<Bucket>, DatabaseError> {
        let row = sqlx::query(
            r#"
            SELECT name, owner_id, is_public, created_at, updated_at
            FROM buckets
            WHERE name = ?
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(row_to_bucket))
    }

    /// List all buckets, newest first.
    pub async fn list_buckets(&self) -> Result<Vec<Bucket>, DatabaseError> {
        let rows = sqlx::query(
            r#"
            SELECT name, owner_id, is_public, created_at, updated_at
            FROM buckets
            ORDER BY created_at DESC, name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(row_to_bucket).collect())
    }

    /// Flip the visibility flag. `None` when no bucket carries the name.
    pub async fn set_bucket_visibility(
        &self,
        name: &str,
        is_public: bool,
    ) -> Result<Option<Bucket>, DatabaseError> {
        let now = Utc::now().timestamp();
        let result = sqlx::query(
            r#"
            UPDATE buckets SET is_public = ?, updated_at = ? WHERE name = ?
            "#,
        )
        .bind(is_public)
        .bind(now)
        .bind(name)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.bucket(name).await
    }

    /// Remove a bucket record, returning it. Deletion is final: no
    /// soft-delete, and cached or remote object content is not purged.
    pub async fn delete_bucket(&self, name: &str) -> Result<Option<Bucket>, DatabaseError> {
        let Some(bucket) = self.bucket(name).await? else {
            return Ok(None);
        };

        sqlx::query(
            r#"
            DELETE FROM buckets WHERE name = ?
            "#,
        )
        .bind(name)
        .execute(&self.pool)
        .await?;

        Ok(Some(bucket))
    }
}

fn row_to_bucket(row: sqlx::sqlite::SqliteRow) -> Bucket {
    Bucket {
        name: row.get("name"),
        owner_id: Uuid::parse_str(&row.get::<String, _>("owner_id")).unwrap_or_default(),
        is_public: row.get::<i32, _>("is_public") != 0,
        created_at: timestamp(row.get("created_at")),
        updated_at: timestamp(row.get("updated_at")),
    }
}

fn timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_resolve_bucket() {
        let db = Database::in_memory().await.unwrap();
        let owner = Uuid::new_v4();

        let created = db.create_bucket("assets", owner, true).await.unwrap();
        assert_eq!(created.name, "assets");
        assert_eq!(created.owner_id, owner);
        assert!(created.is_public);

        let resolved = db.bucket("assets").await.unwrap().unwrap();
        assert_eq!(resolved.name, "assets");
        assert_eq!(resolved.owner_id, owner);

        assert!(db.bucket("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let db = Database::in_memory().await.unwrap();

        db.create_bucket("assets", Uuid::new_v4(), false)
            .await
            .unwrap();
        let err = db
            .create_bucket("assets", Uuid::new_v4(), true)
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::DuplicateName(name) if name == "assets"));
    }

    #[tokio::test]
    async fn test_visibility_update() {
        let db = Database::in_memory().await.unwrap();

        db.create_bucket("assets", Uuid::new_v4(), false)
            .await
            .unwrap();

        let updated = db
            .set_bucket_visibility("assets", true)
            .await
            .unwrap()
            .unwrap();
        assert!(updated.is_public);

        assert!(db
            .set_bucket_visibility("missing", true)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_delete_bucket_is_final() {
        let db = Database::in_memory().await.unwrap();

        db.create_bucket("assets", Uuid::new_v4(), false)
            .await
            .unwrap();

        let deleted = db.delete_bucket("assets").await.unwrap().unwrap();
        assert_eq!(deleted.name, "assets");

        assert!(db.bucket("assets").await.unwrap().is_none());
        assert!(db.delete_bucket("assets").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_buckets() {
        let db = Database::in_memory().await.unwrap();
        let owner = Uuid::new_v4();

        db.create_bucket("one", owner, false).await.unwrap();
        db.create_bucket("two", owner, true).await.unwrap();

        let buckets = db.list_buckets().await.unwrap();
        assert_eq!(buckets.len(), 2);
    }

    #[test]
    fn test_bucket_name_validation() {
        assert!(valid_bucket_name("assets"));
        assert!(valid_bucket_name("my-bucket.v2_final"));

        assert!(!valid_bucket_name(""));
        assert!(!valid_bucket_name(".hidden"));
        assert!(!valid_bucket_name("has/slash"));
        assert!(!valid_bucket_name("has space"));
        assert!(!valid_bucket_name(&"x".repeat(MAX_BUCKET_NAME_LEN + 1)));
    }
}

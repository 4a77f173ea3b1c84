use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::str::FromStr;

use crate::domain::errors::{TemplateError, TemplateResult};
use crate::domain::repositories::KeyValueStore;

/// SQLite implementation of KeyValueStore
///
/// Every slot is one row of `kv_store`; writes upsert the whole value.
pub struct SqliteKeyValueStore {
    pool: SqlitePool,
}

impl SqliteKeyValueStore {
    /// Opens (creating if needed) the database at `url` and ensures the table exists
    ///
    /// # Arguments
    /// * `url` - SQLite URL such as `sqlite://usage.db` or `sqlite::memory:`
    pub async fn connect(url: &str) -> TemplateResult<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| TemplateError::Config(format!("Invalid storage URL {}: {}", url, e)))?
            .create_if_missing(true);

        // An in-memory database lives and dies with its connection, so keep
        // exactly one and never recycle it
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| TemplateError::Storage(format!("Failed to open {}: {}", url, e)))?;

        Self::from_pool(pool).await
    }

    /// Wraps an existing pool and ensures the table exists
    pub async fn from_pool(pool: SqlitePool) -> TemplateResult<Self> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY NOT NULL,
                value BLOB NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| TemplateError::Storage(format!("Failed to create kv_store table: {}", e)))?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> TemplateResult<Option<Vec<u8>>> {
        let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| TemplateError::Storage(format!("Failed to read {}: {}", key, e)))?;

        row.map(|r| r.try_get::<Vec<u8>, _>("value"))
            .transpose()
            .map_err(|e| TemplateError::Storage(format!("Failed to decode {}: {}", key, e)))
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> TemplateResult<()> {
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value)
            VALUES (?1, ?2)
            ON CONFLICT (key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| TemplateError::Storage(format!("Failed to write {}: {}", key, e)))?;

        Ok(())
    }
}

//! PostgreSQL storage engine.
//!
//! All namespaces share one table:
//!
//! ```sql
//! CREATE TABLE kv_items (
//!     namespace  TEXT NOT NULL,
//!     key        TEXT NOT NULL,
//!     value      JSONB NOT NULL,
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     PRIMARY KEY (namespace, key)
//! );
//! ```

use super::{Storage, StorageError, StorageResult};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, Row};
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

/// Upper bound for a single storage query
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Namespaced key-value storage backed by PostgreSQL
#[derive(Clone)]
pub struct PgStorage {
    pool: PgPool,
    namespace: String,
}

impl PgStorage {
    /// Create a storage for `namespace` on an existing pool
    pub fn new(pool: PgPool, namespace: impl Into<String>) -> Self {
        Self {
            pool,
            namespace: namespace.into(),
        }
    }

    /// Namespace this handle reads and writes
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Create the `kv_items` table if it is missing
    pub async fn migrate(pool: &PgPool) -> StorageResult<()> {
        bounded(
            sqlx::query(
                r#"
                CREATE TABLE IF NOT EXISTS kv_items (
                    namespace  TEXT NOT NULL,
                    key        TEXT NOT NULL,
                    value      JSONB NOT NULL,
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    PRIMARY KEY (namespace, key)
                )
                "#,
            )
            .execute(pool),
        )
        .await?;
        Ok(())
    }
}

/// Run a query with [`QUERY_TIMEOUT`]
async fn bounded<F, T>(future: F) -> StorageResult<T>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match timeout(QUERY_TIMEOUT, future).await {
        Ok(result) => result.map_err(StorageError::from),
        Err(_) => Err(StorageError::Timeout(QUERY_TIMEOUT)),
    }
}

#[async_trait]
impl Storage for PgStorage {
    async fn get_item(&self, key: &str) -> StorageResult<Option<Value>> {
        let row = bounded(
            sqlx::query("SELECT value FROM kv_items WHERE namespace = $1 AND key = $2")
                .bind(&self.namespace)
                .bind(key)
                .fetch_optional(&self.pool),
        )
        .await?;

        Ok(row.map(|r| r.get::<Value, _>("value")))
    }

    async fn set_item(&self, key: &str, value: Value) -> StorageResult<()> {
        bounded(
            sqlx::query(
                r#"
                INSERT INTO kv_items (namespace, key, value)
                VALUES ($1, $2, $3)
                ON CONFLICT (namespace, key)
                DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
                "#,
            )
            .bind(&self.namespace)
            .bind(key)
            .bind(value)
            .execute(&self.pool),
        )
        .await?;
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> StorageResult<()> {
        bounded(
            sqlx::query("DELETE FROM kv_items WHERE namespace = $1 AND key = $2")
                .bind(&self.namespace)
                .bind(key)
                .execute(&self.pool),
        )
        .await?;
        Ok(())
    }

    async fn get_keys(&self) -> StorageResult<Vec<String>> {
        let rows = bounded(
            sqlx::query("SELECT key FROM kv_items WHERE namespace = $1 ORDER BY key")
                .bind(&self.namespace)
                .fetch_all(&self.pool),
        )
        .await?;

        Ok(rows.into_iter().map(|r| r.get("key")).collect())
    }

    async fn health_check(&self) -> StorageResult<()> {
        bounded(sqlx::query("SELECT 1").execute(&self.pool)).await?;
        Ok(())
    }
}

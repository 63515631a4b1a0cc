//! PostgreSQL connection pooling for the `postgres` storage backend.
//!
//! One pool is opened per process and shared by every namespace's
//! [`PgStorage`](crate::storage::PgStorage).

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

pub mod config;

pub use config::DatabaseConfig;

/// Pool shared by the tournament, judge, athlete and archive namespaces
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect with the pool limits of `config`
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use kata_judge::db::{Database, DatabaseConfig};
    /// use kata_judge::storage::PgStorage;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let db = Database::new(&DatabaseConfig::development()).await?;
    ///     PgStorage::migrate(db.pool()).await?;
    ///     let _tournaments = PgStorage::new(db.pool().clone(), "tournament");
    ///     Ok(())
    /// }
    /// ```
    pub async fn new(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
            .connect(&config.database_url)
            .await?;

        log::info!(
            "Database pool ready ({}..{} connections)",
            config.min_connections,
            config.max_connections
        );

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

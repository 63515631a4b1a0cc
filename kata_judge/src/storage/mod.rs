//! Key-value storage port and its engines.
//!
//! Every persisted entity in this crate is a JSON document stored under a
//! string key inside a namespace. The [`Storage`] trait is the only way the
//! tournament and registry managers touch persistence, so engines can be
//! swapped through configuration:
//!
//! - [`MemoryStorage`]: process-local map, used by tests and ephemeral runs
//! - [`FsStorage`]: one JSON file per key under a base directory
//! - [`PgStorage`]: a shared PostgreSQL table keyed by `(namespace, key)`
//!
//! ## Example
//!
//! ```no_run
//! use kata_judge::storage::{self, StorageBackend, StorageConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StorageConfig {
//!         backend: StorageBackend::Filesystem {
//!             base_dir: "./data".into(),
//!         },
//!         namespace_suffix: Some("dev".to_string()),
//!     };
//!
//!     let stores = storage::open(&config).await?;
//!     let keys = stores.tournaments.get_keys().await?;
//!     println!("{} tournaments stored", keys.len());
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod fs;
pub mod memory;
pub mod postgres;

pub use errors::{StorageError, StorageResult};
pub use fs::FsStorage;
pub use memory::MemoryStorage;
pub use postgres::PgStorage;

use crate::db::{Database, DatabaseConfig};
use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

/// Namespace holding tournament documents
pub const TOURNAMENT_NAMESPACE: &str = "tournament";
/// Namespace holding judge registry records
pub const JUDGE_NAMESPACE: &str = "judge";
/// Namespace holding athlete registry records
pub const ATHLETE_NAMESPACE: &str = "athlete";
/// Namespace receiving archived tournaments
pub const ARCHIVE_NAMESPACE: &str = "archive";

/// Key-value storage over JSON documents
#[async_trait]
pub trait Storage: Send + Sync {
    /// Load the document stored under `key`
    async fn get_item(&self, key: &str) -> StorageResult<Option<Value>>;

    /// Store `value` under `key`, replacing any previous document
    async fn set_item(&self, key: &str, value: Value) -> StorageResult<()>;

    /// Remove the document under `key`; absent keys are ignored
    async fn remove_item(&self, key: &str) -> StorageResult<()>;

    /// List every key in the namespace
    async fn get_keys(&self) -> StorageResult<Vec<String>>;

    /// Check that the engine is reachable
    async fn health_check(&self) -> StorageResult<()> {
        self.get_keys().await.map(|_| ())
    }
}

/// Storage engine selection
#[derive(Debug, Clone)]
pub enum StorageBackend {
    /// Process-local maps, lost on restart
    Memory,
    /// JSON files, one directory per namespace
    Filesystem { base_dir: PathBuf },
    /// PostgreSQL `kv_items` table
    Postgres(DatabaseConfig),
}

impl StorageBackend {
    /// Engine name as accepted by `STORAGE_BACKEND`
    pub fn name(&self) -> &'static str {
        match self {
            StorageBackend::Memory => "memory",
            StorageBackend::Filesystem { .. } => "fs",
            StorageBackend::Postgres(_) => "postgres",
        }
    }
}

/// Storage configuration injected at startup
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Engine to use
    pub backend: StorageBackend,
    /// Optional suffix appended to every namespace (`tournament-dev`, ...)
    pub namespace_suffix: Option<String>,
}

impl StorageConfig {
    /// In-memory configuration without namespace suffix
    pub fn memory() -> Self {
        Self {
            backend: StorageBackend::Memory,
            namespace_suffix: None,
        }
    }

    /// Resolve the effective namespace name
    pub fn namespace(&self, name: &str) -> String {
        match self.namespace_suffix.as_deref() {
            Some(suffix) if !suffix.is_empty() => format!("{name}-{suffix}"),
            _ => name.to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::memory()
    }
}

/// One storage handle per namespace
#[derive(Clone)]
pub struct StorageSet {
    pub tournaments: Arc<dyn Storage>,
    pub judges: Arc<dyn Storage>,
    pub athletes: Arc<dyn Storage>,
    pub archive: Arc<dyn Storage>,
}

impl StorageSet {
    /// Fresh in-memory namespaces
    pub fn in_memory() -> Self {
        Self {
            tournaments: Arc::new(MemoryStorage::new()),
            judges: Arc::new(MemoryStorage::new()),
            athletes: Arc::new(MemoryStorage::new()),
            archive: Arc::new(MemoryStorage::new()),
        }
    }
}

/// Open every namespace for the configured backend
///
/// PostgreSQL namespaces share a single connection pool and the `kv_items`
/// table is created if it does not exist yet.
pub async fn open(config: &StorageConfig) -> StorageResult<StorageSet> {
    match &config.backend {
        StorageBackend::Memory => {
            log::info!("Using in-memory storage");
            Ok(StorageSet::in_memory())
        }
        StorageBackend::Filesystem { base_dir } => {
            log::info!("Using filesystem storage at {}", base_dir.display());
            let open_ns = |name: &str| -> Arc<dyn Storage> {
                Arc::new(FsStorage::new(base_dir.join(config.namespace(name))))
            };
            Ok(StorageSet {
                tournaments: open_ns(TOURNAMENT_NAMESPACE),
                judges: open_ns(JUDGE_NAMESPACE),
                athletes: open_ns(ATHLETE_NAMESPACE),
                archive: open_ns(ARCHIVE_NAMESPACE),
            })
        }
        StorageBackend::Postgres(db_config) => {
            log::info!("Using PostgreSQL storage");
            let db = Database::new(db_config).await?;
            PgStorage::migrate(db.pool()).await?;
            let open_ns = |name: &str| -> Arc<dyn Storage> {
                Arc::new(PgStorage::new(db.pool().clone(), config.namespace(name)))
            };
            Ok(StorageSet {
                tournaments: open_ns(TOURNAMENT_NAMESPACE),
                judges: open_ns(JUDGE_NAMESPACE),
                athletes: open_ns(ATHLETE_NAMESPACE),
                archive: open_ns(ARCHIVE_NAMESPACE),
            })
        }
    }
}

/// Reject keys that cannot be used as file names or are empty
pub(crate) fn validate_key(key: &str) -> StorageResult<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_without_suffix() {
        let config = StorageConfig::memory();
        assert_eq!(config.namespace(TOURNAMENT_NAMESPACE), "tournament");
    }

    #[test]
    fn test_namespace_with_suffix() {
        let config = StorageConfig {
            backend: StorageBackend::Memory,
            namespace_suffix: Some("dev".to_string()),
        };
        assert_eq!(config.namespace(JUDGE_NAMESPACE), "judge-dev");
    }

    #[test]
    fn test_empty_suffix_is_ignored() {
        let config = StorageConfig {
            backend: StorageBackend::Memory,
            namespace_suffix: Some(String::new()),
        };
        assert_eq!(config.namespace(ATHLETE_NAMESPACE), "athlete");
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("aB3_-x").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("../etc").is_err());
        assert!(validate_key("a b").is_err());
    }

    #[tokio::test]
    async fn test_open_memory_backend() {
        let stores = open(&StorageConfig::memory()).await.unwrap();
        assert_eq!(StorageConfig::memory().backend.name(), "memory");
        stores
            .tournaments
            .set_item("abc", serde_json::json!({"name": "x"}))
            .await
            .unwrap();
        // Namespaces are isolated from each other
        assert!(stores.judges.get_item("abc").await.unwrap().is_none());
        assert!(stores.tournaments.get_item("abc").await.unwrap().is_some());
    }
}

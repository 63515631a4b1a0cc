//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use kata_judge::db::DatabaseConfig;
use kata_judge::storage::{StorageBackend, StorageConfig};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Default listen address
pub const DEFAULT_BIND: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000);

/// Default directory of the `fs` storage backend
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Minimum admin token length
pub const MIN_ADMIN_TOKEN_LEN: usize = 16;

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Shared secret of the tournament organizers
    pub admin_token: String,
    /// Storage engine and namespaces
    pub storage: StorageConfig,
    /// Prometheus scrape address; metrics are off when unset
    pub metrics_bind: Option<SocketAddr>,
}

/// Values given on the command line, taking precedence over the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub bind: Option<SocketAddr>,
    pub storage: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub database_url: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns error if required variables are missing or cannot be parsed
    pub fn from_env(overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let bind = match overrides.bind {
            Some(bind) => bind,
            None => parse_env_opt("SERVER_BIND")?.unwrap_or(DEFAULT_BIND),
        };

        let admin_token =
            std::env::var("ADMIN_TOKEN").map_err(|_| ConfigError::MissingRequired {
                var: "ADMIN_TOKEN".to_string(),
                hint: "Generate with: openssl rand -hex 16".to_string(),
            })?;

        let backend_name = overrides
            .storage
            .or_else(|| std::env::var("STORAGE_BACKEND").ok())
            .unwrap_or_else(|| "fs".to_string());

        let backend = match backend_name.to_lowercase().as_str() {
            "memory" => StorageBackend::Memory,
            "fs" | "filesystem" => StorageBackend::Filesystem {
                base_dir: overrides
                    .data_dir
                    .or_else(|| std::env::var("DATA_DIR").ok().map(PathBuf::from))
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            },
            "postgres" | "postgresql" => {
                let database_url = overrides
                    .database_url
                    .or_else(|| std::env::var("DATABASE_URL").ok())
                    .ok_or_else(|| ConfigError::MissingRequired {
                        var: "DATABASE_URL".to_string(),
                        hint: "Required when STORAGE_BACKEND=postgres".to_string(),
                    })?;
                let defaults = DatabaseConfig::with_url(database_url);
                StorageBackend::Postgres(DatabaseConfig {
                    max_connections: parse_env_or("DB_MAX_CONNECTIONS", defaults.max_connections),
                    min_connections: parse_env_or("DB_MIN_CONNECTIONS", defaults.min_connections),
                    connection_timeout_secs: parse_env_or(
                        "DB_CONNECTION_TIMEOUT_SECS",
                        defaults.connection_timeout_secs,
                    ),
                    idle_timeout_secs: parse_env_or("DB_IDLE_TIMEOUT_SECS", defaults.idle_timeout_secs),
                    max_lifetime_secs: parse_env_or("DB_MAX_LIFETIME_SECS", defaults.max_lifetime_secs),
                    ..defaults
                })
            }
            other => {
                return Err(ConfigError::Invalid {
                    var: "STORAGE_BACKEND".to_string(),
                    reason: format!("Unknown backend '{other}', expected memory, fs or postgres"),
                });
            }
        };

        let namespace_suffix = std::env::var("STORAGE_NAMESPACE_SUFFIX")
            .ok()
            .filter(|s| !s.is_empty());

        Ok(ServerConfig {
            bind,
            admin_token,
            storage: StorageConfig {
                backend,
                namespace_suffix,
            },
            metrics_bind: parse_env_opt("METRICS_BIND")?,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.admin_token.len() < MIN_ADMIN_TOKEN_LEN {
            return Err(ConfigError::Invalid {
                var: "ADMIN_TOKEN".to_string(),
                reason: format!("Must be at least {MIN_ADMIN_TOKEN_LEN} characters"),
            });
        }

        if self.metrics_bind == Some(self.bind) {
            return Err(ConfigError::Invalid {
                var: "METRICS_BIND".to_string(),
                reason: format!("Must differ from the server bind address ({})", self.bind),
            });
        }

        if let StorageBackend::Postgres(db) = &self.storage.backend {
            if db.max_connections == 0 {
                return Err(ConfigError::Invalid {
                    var: "DB_MAX_CONNECTIONS".to_string(),
                    reason: "Must be greater than 0".to_string(),
                });
            }
            if db.min_connections > db.max_connections {
                return Err(ConfigError::Invalid {
                    var: "DB_MIN_CONNECTIONS".to_string(),
                    reason: format!(
                        "Cannot exceed max connections ({})",
                        db.max_connections
                    ),
                });
            }
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parse an optional variable; present but malformed is an error
fn parse_env_opt<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(value) => value.parse().map(Some).map_err(|e| ConfigError::Invalid {
            var: key.to_string(),
            reason: format!("{e}"),
        }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "SERVER_BIND",
        "ADMIN_TOKEN",
        "STORAGE_BACKEND",
        "DATA_DIR",
        "DATABASE_URL",
        "DB_MAX_CONNECTIONS",
        "STORAGE_NAMESPACE_SUFFIX",
        "METRICS_BIND",
    ];

    fn clear_env() {
        for var in VARS {
            // SAFETY: env tests are serialized with #[serial]
            unsafe { std::env::remove_var(var) };
        }
    }

    fn set_env(key: &str, value: &str) {
        // SAFETY: env tests are serialized with #[serial]
        unsafe { std::env::set_var(key, value) };
    }

    fn config(admin_token: &str) -> ServerConfig {
        ServerConfig {
            bind: DEFAULT_BIND,
            admin_token: admin_token.to_string(),
            storage: StorageConfig::memory(),
            metrics_bind: None,
        }
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingRequired {
            var: "ADMIN_TOKEN".to_string(),
            hint: "Use openssl".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("ADMIN_TOKEN"));
        assert!(msg.contains("Use openssl"));
    }

    #[test]
    fn test_short_admin_token_rejected() {
        let err = config("short").validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "ADMIN_TOKEN"));
        assert!(config(&"a".repeat(16)).validate().is_ok());
    }

    #[test]
    fn test_metrics_bind_must_differ() {
        let mut config = config(&"a".repeat(32));
        config.metrics_bind = Some(config.bind);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_pool_bounds_validated() {
        let mut config = config(&"a".repeat(32));
        let mut db = DatabaseConfig::development();
        db.min_connections = db.max_connections + 1;
        config.storage.backend = StorageBackend::Postgres(db);
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_from_env_requires_admin_token() {
        clear_env();
        let err = ServerConfig::from_env(ConfigOverrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired { ref var, .. } if var == "ADMIN_TOKEN"));
    }

    #[test]
    #[serial]
    fn test_from_env_defaults_to_filesystem() {
        clear_env();
        set_env("ADMIN_TOKEN", "0123456789abcdef");

        let config = ServerConfig::from_env(ConfigOverrides::default()).unwrap();
        assert_eq!(config.bind, DEFAULT_BIND);
        assert!(config.metrics_bind.is_none());
        assert!(matches!(
            config.storage.backend,
            StorageBackend::Filesystem { ref base_dir } if base_dir == &PathBuf::from(DEFAULT_DATA_DIR)
        ));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_overrides_win_over_env() {
        clear_env();
        set_env("ADMIN_TOKEN", "0123456789abcdef");
        set_env("STORAGE_BACKEND", "postgres");
        set_env("DATABASE_URL", "postgres://env@db/kata");
        set_env("DB_MAX_CONNECTIONS", "3");
        set_env("STORAGE_NAMESPACE_SUFFIX", "dev");

        let config = ServerConfig::from_env(ConfigOverrides {
            bind: Some("0.0.0.0:8080".parse().unwrap()),
            database_url: Some("postgres://cli@db/kata".to_string()),
            ..ConfigOverrides::default()
        })
        .unwrap();

        assert_eq!(config.bind.port(), 8080);
        assert_eq!(config.storage.namespace("tournament"), "tournament-dev");
        match config.storage.backend {
            StorageBackend::Postgres(db) => {
                assert_eq!(db.database_url, "postgres://cli@db/kata");
                assert_eq!(db.max_connections, 3);
            }
            other => panic!("unexpected backend {other:?}"),
        }
        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_values_rejected() {
        clear_env();
        set_env("ADMIN_TOKEN", "0123456789abcdef");
        set_env("STORAGE_BACKEND", "redis");
        assert!(ServerConfig::from_env(ConfigOverrides::default()).is_err());

        set_env("STORAGE_BACKEND", "memory");
        set_env("SERVER_BIND", "not-an-address");
        let err = ServerConfig::from_env(ConfigOverrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "SERVER_BIND"));

        set_env("SERVER_BIND", "127.0.0.1:4000");
        set_env("STORAGE_BACKEND", "postgres");
        let err = ServerConfig::from_env(ConfigOverrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired { ref var, .. } if var == "DATABASE_URL"));
        clear_env();
    }
}

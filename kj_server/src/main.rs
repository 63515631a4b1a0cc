//! Kata tournament server.
//!
//! Opens the configured storage engine, builds the tournament manager and
//! registries on top of it, and serves the HTTP API.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Error;
use kata_judge::storage;
use kata_judge::{AthleteRegistry, JudgeRegistry, TournamentManager};
use kj_server::api::{self, AppState};
use kj_server::config::{ConfigOverrides, ServerConfig};
use kj_server::{logging, metrics};
use log::info;
use pico_args::Arguments;

const HELP: &str = "\
Run the judo kata tournament server

USAGE:
  kj_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:3000]
  --storage    ENGINE      memory, fs or postgres      [default: env STORAGE_BACKEND or fs]
  --data-dir   PATH        Directory of the fs engine  [default: env DATA_DIR or ./data]
  --db-url     URL         Database connection string  [default: env DATABASE_URL]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  ADMIN_TOKEN              Organizer token, at least 16 characters (required)
  STORAGE_NAMESPACE_SUFFIX Suffix for every namespace, e.g. dev
  METRICS_BIND             Prometheus exporter address (disabled when unset)
  RUST_LOG                 Log filter [default: info,sqlx=warn,hyper=warn]
  (See .env file for all configuration options)
";

fn parse_overrides(pargs: &mut Arguments) -> Result<ConfigOverrides, Error> {
    Ok(ConfigOverrides {
        bind: pargs.opt_value_from_str::<_, SocketAddr>("--bind")?,
        storage: pargs.opt_value_from_str("--storage")?,
        data_dir: pargs.opt_value_from_str::<_, PathBuf>("--data-dir")?,
        database_url: pargs.opt_value_from_str("--db-url")?,
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let overrides = parse_overrides(&mut pargs)?;

    logging::init();

    let config = ServerConfig::from_env(overrides)?;
    config.validate()?;

    if let Some(metrics_bind) = config.metrics_bind {
        metrics::init_metrics(metrics_bind)
            .map_err(|e| anyhow::anyhow!("Failed to start metrics exporter: {}", e))?;
        info!("Prometheus metrics exposed at http://{}/metrics", metrics_bind);
    }

    info!("Opening {} storage", config.storage.backend.name());
    let stores = storage::open(&config.storage)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to open storage: {}", e))?;

    let tournaments =
        TournamentManager::new(stores.tournaments.clone()).with_archive(stores.archive);
    match tournaments.list_tournaments().await {
        Ok(list) => info!("Loaded {} tournament(s)", list.len()),
        Err(e) => log::error!("Failed to list tournaments: {}", e),
    }

    let state = AppState {
        tournaments: Arc::new(tournaments),
        judges: Arc::new(JudgeRegistry::new(stores.judges)),
        athletes: Arc::new(AthleteRegistry::new(stores.athletes)),
        storage: stores.tournaments,
        admin_token: Arc::from(config.admin_token.as_str()),
    };

    let app = api::create_router(state);

    info!("Starting HTTP server on {}", config.bind);
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", config.bind, e))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Shutting down server...");

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}

//! Structured logging configuration.
//!
//! The library crate logs through the `log` facade; the subscriber installed
//! here also captures those records, so both end up in the same output with
//! the same filter.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured logging
///
/// Log levels are read from `RUST_LOG`, defaulting to
/// `info,sqlx=warn,hyper=warn`.
///
/// # Example
///
/// ```no_run
/// use kj_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,hyper=warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log security event with structured data
///
/// # Example
///
/// ```
/// use kj_server::logging::log_security_event;
///
/// log_security_event("admin_token_rejected", Some("/api/v1/tournaments"), "Wrong admin token");
/// ```
pub fn log_security_event(event_type: &str, path: Option<&str>, message: &str) {
    tracing::warn!(
        event_type = event_type,
        http_path = path,
        "SECURITY: {}",
        message
    );
}

/// Log a storage round trip made on behalf of a request
///
/// Slow operations are raised to a warning.
pub fn log_storage_operation(operation: &str, namespace: &str, duration_ms: u64) {
    tracing::debug!(
        operation = operation,
        namespace = namespace,
        duration_ms = duration_ms,
        "Storage operation"
    );

    if duration_ms > 100 {
        tracing::warn!(
            operation = operation,
            namespace = namespace,
            duration_ms = duration_ms,
            "Slow storage operation detected"
        );
    }
}

/// Log API request/response
pub fn log_api_request(
    method: &str,
    path: &str,
    status_code: u16,
    duration_ms: u64,
    request_id: &str,
) {
    tracing::info!(
        http_method = method,
        http_path = path,
        http_status = status_code,
        duration_ms = duration_ms,
        request_id = request_id,
        "API request completed"
    );
}

//! Prometheus metrics for monitoring tournament server health.
//!
//! Metrics are recorded through the `metrics` facade and exposed in
//! Prometheus text format when an exporter is installed with
//! [`init_metrics`]. Without an exporter every call is a no-op.
//!
//! # Metrics Categories
//!
//! - **HTTP Metrics**: Request counts and durations by route
//! - **Tournament Metrics**: Created tournaments, saves, version conflicts
//! - **Judging Metrics**: Completed matches, score sheet submissions
//! - **Storage Metrics**: Round-trip durations
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use kj_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::http_requests_total("GET", "/api/v1/mats/{}", 200);
//! metrics::score_submissions_total(true);
//! ```

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record HTTP request.
pub fn http_requests_total(method: &str, route: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, route: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string(),
        "route" => route.to_string()
    )
    .record(duration_ms);
}

// ============================================================================
// Tournament Metrics
// ============================================================================

/// Increment created tournaments counter.
pub fn tournaments_created_total() {
    metrics::counter!("tournaments_created_total").increment(1);
}

/// Record a tournament save attempt by outcome (`ok`, `conflict`, `rejected`, `error`).
pub fn tournament_saves_total(outcome: &str) {
    metrics::counter!("tournament_saves_total",
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

// ============================================================================
// Judging Metrics
// ============================================================================

/// Increment completed matches counter.
pub fn matches_completed_total() {
    metrics::counter!("matches_completed_total").increment(1);
}

/// Record a judge score sheet submission.
pub fn score_submissions_total(accepted: bool) {
    metrics::counter!("score_submissions_total",
        "accepted" => accepted.to_string()
    )
    .increment(1);
}

// ============================================================================
// Storage Metrics
// ============================================================================

/// Record storage round-trip duration in milliseconds.
pub fn storage_operation_duration_ms(operation: &str, duration_ms: f64) {
    metrics::histogram!("storage_operation_duration_ms",
        "operation" => operation.to_string()
    )
    .record(duration_ms);
}

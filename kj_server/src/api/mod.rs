//! HTTP API for the kata tournament server.
//!
//! This module provides the REST API used by the organizer console, the mat
//! displays and the judges' tablets.
//!
//! # Architecture
//!
//! The API is built with:
//! - **Axum**: async web framework
//! - **Tower**: middleware for CORS, request ids and authentication
//! - **Versioned documents**: every change loads a tournament, edits it and
//!   saves it with an optimistic version check
//!
//! # Modules
//!
//! - [`tournaments`]: tournament, mat, group and match administration
//! - [`mats`]: mat display and judge tablet endpoints
//! - [`registry`]: judge and athlete registries
//! - [`middleware`]: admin token check and the tournament bearer extractor
//! - [`errors`]: mapping of domain errors onto status codes
//!
//! # Endpoints Overview
//!
//! ## Public
//! - `GET /health` - Server and storage health
//! - `GET /api/v1/tournaments` - List tournaments
//! - `GET /api/v1/tournaments/{id}` - Tournament document without judge codes
//!
//! ## Mat clients (tournament id as bearer token)
//! - `GET /api/v1/mats/{mat}` - Pending matches of a mat
//! - `GET /api/v1/mats/{mat}/judges/{code}` - Next match for a judge
//! - `PUT /api/v1/mats/{mat}/judges/{code}/scores` - Submit a judge's sheet
//!
//! ## Admin (admin token as bearer token)
//! - `GET /api/v1/login` - Token check
//! - Tournament, mat, group and match editing under `/api/v1/tournaments`
//! - `/api/v1/judges` and `/api/v1/athletes` registries
//!
//! # CORS
//!
//! CORS is configured permissively; the mat displays are served from
//! other origins at the venue.

pub mod errors;
pub mod mats;
pub mod middleware;
pub mod registry;
pub mod request_id;
pub mod tournaments;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get, patch, post, put},
};
use kata_judge::{AthleteRegistry, JudgeRegistry, Storage, TournamentManager};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request; every field is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub tournaments: Arc<TournamentManager>,
    pub judges: Arc<JudgeRegistry>,
    pub athletes: Arc<AthleteRegistry>,
    /// Tournament namespace, probed by the health check
    pub storage: Arc<dyn Storage>,
    /// Shared secret of the organizers
    pub admin_token: Arc<str>,
}

/// Create the complete API router with all endpoints and middleware.
///
/// # Endpoint Summary
///
/// ```text
/// GET    /health                                              - Health check (public)
/// GET    /api/v1/login                                        - Token check (admin)
/// GET    /api/v1/tournaments                                  - List (public)
/// POST   /api/v1/tournaments                                  - Create (admin)
/// GET    /api/v1/tournaments/{id}                             - Get (public)
/// PUT    /api/v1/tournaments/{id}                             - Replace fields (admin)
/// DELETE /api/v1/tournaments/{id}                             - Remove (admin)
/// POST   /api/v1/tournaments/{id}/archive                     - Archive (admin)
/// POST   /api/v1/tournaments/{id}/m                           - Create mat (admin)
/// DELETE /api/v1/tournaments/{id}/m/{mat}                     - Delete mat (admin)
/// PUT    /api/v1/tournaments/{id}/m/{mat}/judges/{slot}       - Assign judge (admin)
/// POST   /api/v1/tournaments/{id}/m/{mat}/g                   - Create group (admin)
/// POST   /api/v1/tournaments/{id}/m/{mat}/g/{group}           - Update group (admin)
/// DELETE /api/v1/tournaments/{id}/m/{mat}/g/{group}           - Delete group (admin)
/// POST   /api/v1/tournaments/{id}/m/{mat}/g/{group}/matches   - Create match (admin)
/// PATCH  /api/v1/tournaments/{id}/m/{mat}/g/{group}/matches/{match} - Update match (admin)
/// DELETE /api/v1/tournaments/{id}/m/{mat}/g/{group}/matches/{match} - Delete match (admin)
/// GET    /api/v1/mats/{mat}                                   - Mat view (tournament bearer)
/// GET    /api/v1/mats/{mat}/judges/{code}                     - Judge view (tournament bearer)
/// PUT    /api/v1/mats/{mat}/judges/{code}/scores              - Submit scores (tournament bearer)
/// GET    /api/v1/judges, POST /api/v1/judges                  - Judge registry (admin)
/// GET    /api/v1/judges/{id}, PUT, DELETE                     - Judge record (admin)
/// GET    /api/v1/athletes, POST /api/v1/athletes              - Athlete registry (admin)
/// GET    /api/v1/athletes/{id}, DELETE                        - Athlete record (admin)
/// ```
///
/// # Example
///
/// ```rust,no_run
/// # use kj_server::api::{create_router, AppState};
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let state: AppState = unimplemented!();
/// let app = create_router(state);
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```
pub fn create_router(state: AppState) -> Router {
    let v1_routes = create_v1_router(state.clone());

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", v1_routes)
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Create API v1 router with all versioned endpoints.
fn create_v1_router(state: AppState) -> Router<AppState> {
    // Public routes (no authentication)
    let public_routes = Router::new()
        .route("/tournaments", get(tournaments::list_tournaments))
        .route("/tournaments/{id}", get(tournaments::get_tournament));

    // Mat clients carry the tournament id; checked by the extractor
    let mat_routes = Router::new()
        .route("/mats/{mat}", get(mats::mat_view))
        .route("/mats/{mat}/judges/{code}", get(mats::judge_view))
        .route("/mats/{mat}/judges/{code}/scores", put(mats::submit_scores));

    // Organizer routes (require the admin token)
    let admin_routes = Router::new()
        .route("/login", get(login))
        .route("/tournaments", post(tournaments::create_tournament))
        .route(
            "/tournaments/{id}",
            put(tournaments::update_tournament).delete(tournaments::remove_tournament),
        )
        .route(
            "/tournaments/{id}/archive",
            post(tournaments::archive_tournament),
        )
        .route("/tournaments/{id}/m", post(tournaments::create_mat))
        .route(
            "/tournaments/{id}/m/{mat}",
            delete(tournaments::delete_mat),
        )
        .route(
            "/tournaments/{id}/m/{mat}/judges/{slot}",
            put(tournaments::assign_judge),
        )
        .route("/tournaments/{id}/m/{mat}/g", post(tournaments::create_group))
        .route(
            "/tournaments/{id}/m/{mat}/g/{group}",
            post(tournaments::update_group).delete(tournaments::delete_group),
        )
        .route(
            "/tournaments/{id}/m/{mat}/g/{group}/matches",
            post(tournaments::create_match),
        )
        .route(
            "/tournaments/{id}/m/{mat}/g/{group}/matches/{match}",
            patch(tournaments::update_match).delete(tournaments::delete_match),
        )
        .route(
            "/judges",
            get(registry::list_judges).post(registry::create_judge),
        )
        .route(
            "/judges/{id}",
            get(registry::get_judge)
                .put(registry::update_judge)
                .delete(registry::remove_judge),
        )
        .route(
            "/athletes",
            get(registry::list_athletes).post(registry::create_athlete),
        )
        .route(
            "/athletes/{id}",
            get(registry::get_athlete).delete(registry::remove_athlete),
        )
        .layer(axum::middleware::from_fn_with_state(
            state,
            middleware::admin_auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(mat_routes)
        .merge(admin_routes)
}

/// Admin token check for the organizer console.
///
/// The middleware has already accepted the token when this runs.
async fn login() -> impl IntoResponse {
    Json(json!({ "authenticated": true }))
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when the storage engine answers, `503 Service
/// Unavailable` otherwise.
///
/// # Example
///
/// ```bash
/// curl http://localhost:3000/health
/// # {"status":"healthy","version":"0.1.0","storage":true,"timestamp":"2026-04-12T10:30:00Z"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let storage_healthy = match state.storage.health_check().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Storage health check failed");
            false
        }
    };

    let status_code = if storage_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if storage_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "storage": storage_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}

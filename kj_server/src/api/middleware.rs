//! Authentication for organizer and mat endpoints.
//!
//! Two bearer tokens are in play:
//!
//! - the **admin token**, a shared secret of the organizers, required by
//!   every route that changes a tournament or a registry;
//! - the **tournament id**, which mat displays and judge tablets send as
//!   their bearer token to read the mat they are set up for.
//!
//! ```rust,no_run
//! use axum::{Router, routing::post, middleware};
//! # use kj_server::api::middleware::admin_auth_middleware;
//! # use kj_server::api::AppState;
//! # async fn handler() {}
//! # let state: AppState = unimplemented!();
//!
//! let admin_routes: Router<AppState> = Router::new()
//!     .route("/tournaments", post(handler))
//!     .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware));
//! # let _ = admin_routes;
//! ```

use axum::{
    Json,
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;

use super::AppState;
use super::errors::ErrorResponse;
use crate::logging::log_security_event;

/// Token of an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Admin authentication middleware.
///
/// # Behavior
///
/// - **Missing header or empty token**: `401 Unauthorized`
/// - **Wrong token**: `403 Forbidden`
/// - **Matching token**: calls the next handler
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(token) = bearer_token(request.headers()) else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    // Constant-time comparison
    let matches: bool = token
        .as_bytes()
        .ct_eq(state.admin_token.as_bytes())
        .into();
    if !matches {
        log_security_event(
            "admin_token_rejected",
            Some(request.uri().path()),
            "Request with wrong admin token",
        );
        return Err(StatusCode::FORBIDDEN);
    }

    Ok(next.run(request).await)
}

/// Tournament id presented as bearer token by mat clients
#[derive(Debug, Clone)]
pub struct TournamentToken(pub String);

impl<S> FromRequestParts<S> for TournamentToken
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        bearer_token(&parts.headers)
            .map(|token| TournamentToken(token.to_string()))
            .ok_or((
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: "unauthorized".to_string(),
                }),
            ))
    }
}

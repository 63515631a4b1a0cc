//! Mapping of domain errors onto HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use kata_judge::registry::RegistryError;
use kata_judge::storage::StorageError;
use kata_judge::tournament::TournamentError;
use serde::{Deserialize, Serialize};

/// JSON error body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error returned by every handler
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

fn storage_status(err: &StorageError) -> StatusCode {
    match err {
        StorageError::InvalidKey(_) => StatusCode::BAD_REQUEST,
        StorageError::Timeout(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<TournamentError> for ApiError {
    fn from(err: TournamentError) -> Self {
        let status = match &err {
            e if e.is_not_found() => StatusCode::NOT_FOUND,
            TournamentError::AlreadyCompleted { .. } | TournamentError::Conflict { .. } => {
                StatusCode::CONFLICT
            }
            TournamentError::JudgeSlotOutOfRange { .. }
            | TournamentError::InvalidJudgeCount { .. }
            | TournamentError::InvalidScoreSheet(_) => StatusCode::BAD_REQUEST,
            TournamentError::IdsExhausted { .. } => StatusCode::SERVICE_UNAVAILABLE,
            TournamentError::Storage(e) => storage_status(e),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %err, "Tournament operation failed");
        }
        Self::new(status, err.client_message())
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        let status = match &err {
            RegistryError::Validation(_) => StatusCode::BAD_REQUEST,
            RegistryError::IdsExhausted { .. } => StatusCode::SERVICE_UNAVAILABLE,
            RegistryError::Storage(e) => storage_status(e),
            RegistryError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %err, "Registry operation failed");
        }
        Self::new(status, err.client_message())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

/// Result type for JSON handlers
pub type ApiResult<T> = Result<Json<T>, ApiError>;

//! Judge and athlete registry handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use kata_judge::registry::{Athlete, AthleteData, Judge, JudgeData, JudgeSummary};

use super::AppState;
use super::errors::{ApiError, ApiResult};

/// List judges without contact details.
pub async fn list_judges(State(state): State<AppState>) -> ApiResult<Vec<JudgeSummary>> {
    Ok(Json(state.judges.list().await?))
}

/// Register a judge under a fresh 4-character id.
pub async fn create_judge(
    State(state): State<AppState>,
    Json(data): Json<JudgeData>,
) -> Result<(StatusCode, Json<Judge>), ApiError> {
    let judge = state.judges.create(data).await?;
    tracing::info!(judge_id = %judge.id, "Judge registered");
    Ok((StatusCode::CREATED, Json(judge)))
}

pub async fn get_judge(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Judge> {
    state
        .judges
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Judge not found"))
}

/// Replace a judge record; an unknown id creates it.
pub async fn update_judge(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(data): Json<JudgeData>,
) -> ApiResult<Judge> {
    Ok(Json(state.judges.update(&id, data).await?))
}

pub async fn remove_judge(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.judges.remove(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_athletes(State(state): State<AppState>) -> ApiResult<Vec<Athlete>> {
    Ok(Json(state.athletes.list().await?))
}

/// Register an athlete.
///
/// # Errors
///
/// - `400 Bad Request`: blank name
pub async fn create_athlete(
    State(state): State<AppState>,
    Json(data): Json<AthleteData>,
) -> Result<(StatusCode, Json<Athlete>), ApiError> {
    let athlete = state.athletes.create(data).await?;
    Ok((StatusCode::CREATED, Json(athlete)))
}

pub async fn get_athlete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Athlete> {
    state
        .athletes
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Athlete not found"))
}

pub async fn remove_athlete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.athletes.remove(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

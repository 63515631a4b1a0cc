//! Tournament administration handlers.
//!
//! Every mutating endpoint loads the tournament, applies one aggregate
//! operation and saves it with a version check. A save that loses a race
//! with another writer answers `409 Conflict`; the client reloads and
//! retries.
//!
//! Mat, group and match indices in these routes are 0-based positions, the
//! same indices the aggregate uses. Deleting an element shifts every later
//! element down by one.
//!
//! # Examples
//!
//! Create a tournament:
//! ```bash
//! curl -X POST http://localhost:3000/api/v1/tournaments \
//!   -H "Authorization: Bearer $ADMIN_TOKEN" \
//!   -H "Content-Type: application/json" \
//!   -d '{"name": "Spring Open", "showJudgeTotals": true}'
//! ```
//!
//! Add a match to the first group of the first mat:
//! ```bash
//! curl -X POST http://localhost:3000/api/v1/tournaments/V1StGX/m/0/g/0/matches \
//!   -H "Authorization: Bearer $ADMIN_TOKEN" \
//!   -H "Content-Type: application/json" \
//!   -d '{"tori": "Tanaka", "uke": "Suzuki"}'
//! ```

use std::time::Instant;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use kata_judge::tournament::{
    Group, GroupFields, Match, MatchFields, MatchUpdate, NewTournament, Tournament,
    TournamentData, TournamentError, TournamentFields, TournamentResult, TournamentSummary,
};
use serde::{Deserialize, Serialize};

use super::AppState;
use super::errors::{ApiError, ApiResult};
use crate::logging::log_storage_operation;
use crate::metrics;

/// Position of a newly created element with the updated tournament
#[derive(Debug, Serialize, Deserialize)]
pub struct IndexResponse {
    pub index: usize,
    pub tournament: TournamentData,
}

#[derive(Debug, Deserialize)]
pub struct AssignJudgeRequest {
    pub name: String,
}

/// Load, change and save a tournament, recording timing and outcome
async fn edit<T, F>(
    state: &AppState,
    id: &str,
    operation: &str,
    change: F,
) -> Result<(Tournament, T), ApiError>
where
    F: FnOnce(&mut Tournament) -> TournamentResult<T>,
{
    let start = Instant::now();
    let result = state.tournaments.update_tournament(id, change).await;
    let duration_ms = start.elapsed().as_millis() as u64;

    log_storage_operation(operation, "tournament", duration_ms);
    metrics::storage_operation_duration_ms(operation, duration_ms as f64);

    let outcome = match &result {
        Ok(_) => "ok",
        Err(TournamentError::Conflict { .. }) => "conflict",
        Err(TournamentError::Storage(_) | TournamentError::Serialization(_)) => "error",
        Err(_) => "rejected",
    };
    metrics::tournament_saves_total(outcome);

    Ok(result?)
}

/// List tournament summaries.
///
/// # Response
///
/// `200 OK` with `[{"id": "V1StGX", "name": "Spring Open", "showJudgeTotals": true}]`
pub async fn list_tournaments(State(state): State<AppState>) -> ApiResult<Vec<TournamentSummary>> {
    Ok(Json(state.tournaments.list_tournaments().await?))
}

/// Create an empty tournament.
///
/// Missing fields default to the name `"Tournament 1"` with judge totals
/// shown.
///
/// # Response
///
/// `201 Created` with the full tournament document
pub async fn create_tournament(
    State(state): State<AppState>,
    Json(fields): Json<NewTournament>,
) -> Result<(StatusCode, Json<TournamentData>), ApiError> {
    let tournament = state.tournaments.create_tournament(fields).await?;
    metrics::tournaments_created_total();
    Ok((StatusCode::CREATED, Json(tournament.data())))
}

/// Full tournament document, without the judges' access codes.
///
/// # Errors
///
/// - `404 Not Found`: no tournament with this id
pub async fn get_tournament(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<TournamentData> {
    Ok(Json(state.tournaments.load(&id).await?.public_data()))
}

/// Overwrite the tournament name and judge-totals flag.
pub async fn update_tournament(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(fields): Json<TournamentFields>,
) -> ApiResult<TournamentData> {
    let (tournament, ()) = edit(&state, &id, "replace", |t| {
        t.replace(fields);
        Ok(())
    })
    .await?;
    Ok(Json(tournament.data()))
}

/// Delete a tournament.
///
/// # Response
///
/// `204 No Content`, or `404 Not Found` when nothing was stored under the id
pub async fn remove_tournament(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.tournaments.remove_tournament(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Tournament not found"))
    }
}

/// Move a tournament to the archive.
pub async fn archive_tournament(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.tournaments.archive_tournament(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Append a mat with a fresh set of judge access codes.
pub async fn create_mat(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<IndexResponse>), ApiError> {
    let (tournament, index) = edit(&state, &id, "create_mat", |t| {
        Ok(t.create_mat(state.tournaments.id_generator()))
    })
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(IndexResponse {
            index,
            tournament: tournament.data(),
        }),
    ))
}

/// Remove a mat; an index past the end leaves the tournament unchanged.
pub async fn delete_mat(
    State(state): State<AppState>,
    Path((id, mat)): Path<(String, usize)>,
) -> ApiResult<TournamentData> {
    let (tournament, removed) =
        edit(&state, &id, "delete_mat", |t| Ok(t.delete_mat(mat))).await?;
    if removed.is_none() {
        tracing::debug!(tournament = %id, mat, "Delete of missing mat ignored");
    }
    Ok(Json(tournament.data()))
}

/// Seat a judge name in a slot of the mat roster.
///
/// # Errors
///
/// - `400 Bad Request`: slot is not below the mat's number of judges
/// - `404 Not Found`: tournament or mat does not exist
pub async fn assign_judge(
    State(state): State<AppState>,
    Path((id, mat, slot)): Path<(String, usize, usize)>,
    Json(request): Json<AssignJudgeRequest>,
) -> ApiResult<TournamentData> {
    let (tournament, ()) = edit(&state, &id, "assign_judge", |t| {
        t.assign_judge(mat, slot, request.name)
    })
    .await?;
    Ok(Json(tournament.data()))
}

pub async fn create_group(
    State(state): State<AppState>,
    Path((id, mat)): Path<(String, usize)>,
    Json(fields): Json<GroupFields>,
) -> Result<(StatusCode, Json<IndexResponse>), ApiError> {
    let (tournament, index) =
        edit(&state, &id, "create_group", |t| t.create_group(mat, fields)).await?;

    Ok((
        StatusCode::CREATED,
        Json(IndexResponse {
            index,
            tournament: tournament.data(),
        }),
    ))
}

/// Replace every field of a group; its matches are kept.
pub async fn update_group(
    State(state): State<AppState>,
    Path((id, mat, group)): Path<(String, usize, usize)>,
    Json(fields): Json<GroupFields>,
) -> ApiResult<TournamentData> {
    let (tournament, ()) = edit(&state, &id, "update_group", |t| {
        t.update_group(mat, group, fields).map(|_: &Group| ())
    })
    .await?;
    Ok(Json(tournament.data()))
}

pub async fn delete_group(
    State(state): State<AppState>,
    Path((id, mat, group)): Path<(String, usize, usize)>,
) -> ApiResult<TournamentData> {
    let (tournament, _) =
        edit(&state, &id, "delete_group", |t| t.delete_group(mat, group)).await?;
    Ok(Json(tournament.data()))
}

/// Append a match to a group.
///
/// Without explicit `scores`, one empty sheet per judge is seeded, sized for
/// the match kata (or the group kata when the match has none).
pub async fn create_match(
    State(state): State<AppState>,
    Path((id, mat, group)): Path<(String, usize, usize)>,
    Json(fields): Json<MatchFields>,
) -> Result<(StatusCode, Json<IndexResponse>), ApiError> {
    let (tournament, index) = edit(&state, &id, "create_match", |t| {
        t.create_match(mat, group, fields)
    })
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(IndexResponse {
            index,
            tournament: tournament.data(),
        }),
    ))
}

/// Merge the given fields into a match.
///
/// # Errors
///
/// - `409 Conflict`: the match is already completed, or the tournament was
///   saved by someone else meanwhile
pub async fn update_match(
    State(state): State<AppState>,
    Path((id, mat, group, index)): Path<(String, usize, usize, usize)>,
    Json(update): Json<MatchUpdate>,
) -> ApiResult<Match> {
    let completes = update.completed == Some(true);
    let (_, updated) = edit(&state, &id, "update_match", |t| {
        t.update_match(mat, group, index, update).cloned()
    })
    .await?;

    if completes {
        metrics::matches_completed_total();
    }
    Ok(Json(updated))
}

pub async fn delete_match(
    State(state): State<AppState>,
    Path((id, mat, group, index)): Path<(String, usize, usize, usize)>,
) -> ApiResult<TournamentData> {
    let (tournament, _) = edit(&state, &id, "delete_match", |t| {
        t.delete_match(mat, group, index)
    })
    .await?;
    Ok(Json(tournament.data()))
}

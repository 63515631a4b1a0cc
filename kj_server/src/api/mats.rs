//! Mat display and judge tablet handlers.
//!
//! These clients authenticate with the tournament id as bearer token and
//! address mats by their 1-based number as printed at the venue.

use axum::{
    Json,
    extract::{Path, State},
};
use kata_judge::ScoreSheet;
use kata_judge::tournament::{JudgeMatchView, MatMatchView, Tournament};

use super::AppState;
use super::errors::{ApiError, ApiResult};
use super::middleware::TournamentToken;
use crate::metrics;

/// Saves tried per sheet submission before answering `409 Conflict`
const SUBMIT_ATTEMPTS: usize = 3;

/// 0-based mat index of a 1-based mat number
fn mat_index(number: usize) -> Result<usize, ApiError> {
    number
        .checked_sub(1)
        .ok_or_else(|| ApiError::not_found("Mat not found"))
}

async fn load(state: &AppState, token: &TournamentToken) -> Result<Tournament, ApiError> {
    Ok(state.tournaments.load(&token.0).await?)
}

/// Pending matches of a mat, numbered by position on the mat.
///
/// # Response
///
/// `200 OK` with
/// ```json
/// [{"number": 3, "kata": "Nage-no-kata", "tori": "Tanaka", "uke": "Suzuki", "judgeTotals": [0, 0, 0, 0, 0]}]
/// ```
/// `judgeTotals` is left out when the tournament hides judge totals.
///
/// # Errors
///
/// - `401 Unauthorized`: no bearer token
/// - `404 Not Found`: unknown tournament or mat
pub async fn mat_view(
    State(state): State<AppState>,
    token: TournamentToken,
    Path(mat): Path<usize>,
) -> ApiResult<Vec<MatMatchView>> {
    let mat = mat_index(mat)?;
    let tournament = load(&state, &token).await?;
    Ok(Json(tournament.mat_view(mat)?))
}

/// The match a judge should score next, with only that judge's sheet.
///
/// # Errors
///
/// - `400 Bad Request`: the judge's slot is not on the pending match's panel
/// - `404 Not Found`: unknown tournament, mat or judge code, or no match
///   left to score on the mat
pub async fn judge_view(
    State(state): State<AppState>,
    token: TournamentToken,
    Path((mat, code)): Path<(usize, String)>,
) -> ApiResult<JudgeMatchView> {
    let mat = mat_index(mat)?;
    let tournament = load(&state, &token).await?;
    tournament
        .judge_view(mat, &code)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("No pending match"))
}

/// Store a judge's sheet on the mat's next match.
///
/// Only the judge's own slot is written, so judges scoring the same match
/// at once do not overwrite each other. A save that collides with another
/// judge's is replayed on a fresh load before giving up with `409 Conflict`.
///
/// # Request
///
/// The full sheet for the match kata, e.g. `[{"value": 10, "deductions": ":::::"}, ...]`
///
/// # Errors
///
/// - `400 Bad Request`: sheet length or deductions do not fit the kata, or
///   the judge's slot is not on the match's panel
/// - `404 Not Found`: unknown tournament, mat or judge code, or nothing
///   pending
/// - `409 Conflict`: the match was completed, or the tournament kept
///   changing across every retry
pub async fn submit_scores(
    State(state): State<AppState>,
    token: TournamentToken,
    Path((mat, code)): Path<(usize, String)>,
    Json(sheet): Json<ScoreSheet>,
) -> ApiResult<JudgeMatchView> {
    let mat = mat_index(mat)?;
    let result = state
        .tournaments
        .update_tournament_retrying(&token.0, SUBMIT_ATTEMPTS, |t| {
            t.submit_judge_scores(mat, &code, sheet.clone())?;
            t.judge_view(mat, &code)
        })
        .await;
    metrics::score_submissions_total(result.is_ok());

    let (_, view) = result?;
    view.map(Json)
        .ok_or_else(|| ApiError::not_found("No pending match"))
}

//! Leaderboard route.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use storyweave_progress::application::query_handlers;
use storyweave_progress::domain::leaderboard::Leaderboard;

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for GET /leaderboard.
#[derive(Debug, Deserialize)]
pub struct LeaderboardParams {
    /// Viewing player; their own rank is appended when outside the top rows.
    pub user_id: Option<Uuid>,
    /// Number of rows, 1 to 100 (default 10).
    pub limit: Option<u32>,
}

/// GET /leaderboard
#[instrument(skip(state))]
async fn get_leaderboard(
    State(state): State<AppState>,
    Query(params): Query<LeaderboardParams>,
) -> Result<Json<Leaderboard>, ApiError> {
    let board = query_handlers::get_leaderboard(
        params.user_id,
        params.limit,
        state.game.scores.as_ref(),
        state.game.profiles.as_ref(),
    )
    .await?;
    Ok(Json(board))
}

/// Returns the leaderboard router.
pub fn router() -> Router<AppState> {
    Router::new().route("/leaderboard", get(get_leaderboard))
}

//! Player profile route.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use tracing::instrument;
use uuid::Uuid;

use storyweave_progress::application::query_handlers::{self, PlayerProfileView};

use crate::error::ApiError;
use crate::state::AppState;

/// GET /profiles/{user_id}
#[instrument(skip(state))]
async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<PlayerProfileView>, ApiError> {
    let view = query_handlers::get_player_profile(
        user_id,
        state.game.profiles.as_ref(),
        state.game.scores.as_ref(),
        state.game.achievements.as_ref(),
    )
    .await?;
    Ok(Json(view))
}

/// Returns the profile router.
pub fn router() -> Router<AppState> {
    Router::new().route("/profiles/{user_id}", get(get_profile))
}

//! Achievement catalog route.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use tracing::instrument;

use storyweave_progress::application::query_handlers;
use storyweave_progress::domain::achievements::AchievementView;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /achievements
#[instrument(skip(state))]
async fn list_achievements(
    State(state): State<AppState>,
) -> Result<Json<Vec<AchievementView>>, ApiError> {
    let catalog = query_handlers::get_achievement_catalog(state.game.achievements.as_ref()).await?;
    Ok(Json(catalog))
}

/// Returns the achievement catalog router.
pub fn router() -> Router<AppState> {
    Router::new().route("/achievements", get(list_achievements))
}

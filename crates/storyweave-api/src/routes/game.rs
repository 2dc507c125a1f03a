//! Routes for playing the story.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use storyweave_story::application::command_handlers::{self, CommandOutcome, SaveOutcome};
use storyweave_story::application::query_handlers::{self, GameStateView};
use storyweave_story::application::session::{HighScoreSubmission, PersistenceFailure};
use storyweave_story::domain::commands;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /game/choose.
#[derive(Debug, Deserialize)]
pub struct ChooseRequest {
    /// The player.
    pub user_id: Uuid,
    /// Scene the client is showing.
    pub scene_key: String,
    /// Index of the picked choice within that scene.
    pub choice_index: usize,
}

/// Request body for POST /game/restart and POST /game/save.
#[derive(Debug, Deserialize)]
pub struct PlayerRequest {
    /// The player.
    pub user_id: Uuid,
}

/// Response body returned after a command is handled.
///
/// `warnings` lists side effects that could not be persisted; the returned
/// state is still authoritative for this request.
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    /// IDs of the domain events produced.
    pub event_ids: Vec<Uuid>,
    /// The player's state after the command.
    pub state: GameStateView,
    /// Achievements granted by this command.
    pub unlocked_achievements: Vec<String>,
    /// Score submission, when the run ended.
    pub high_score: Option<HighScoreSubmission>,
    /// Side effects that failed to persist.
    pub warnings: Vec<PersistenceFailure>,
}

impl From<CommandOutcome> for CommandResponse {
    fn from(outcome: CommandOutcome) -> Self {
        Self {
            event_ids: outcome
                .report
                .events
                .iter()
                .map(|e| e.metadata.event_id)
                .collect(),
            state: outcome.state,
            unlocked_achievements: outcome.report.unlocked_achievements,
            high_score: outcome.report.high_score,
            warnings: outcome.report.failures,
        }
    }
}

/// Response body for POST /game/save.
#[derive(Debug, Serialize)]
pub struct SaveResponse {
    /// Whether pending progress was written.
    pub saved: bool,
    /// The player's state.
    pub state: GameStateView,
}

impl From<SaveOutcome> for SaveResponse {
    fn from(outcome: SaveOutcome) -> Self {
        Self {
            saved: outcome.saved,
            state: outcome.state,
        }
    }
}

/// GET /game/{user_id}
#[instrument(skip(state))]
async fn get_game(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<GameStateView>, ApiError> {
    let view = query_handlers::get_game_state(user_id, &state.sessions).await?;
    Ok(Json(view))
}

/// POST /game/choose
#[instrument(
    skip(state, request),
    fields(user_id = %request.user_id, scene_key = %request.scene_key, choice_index = request.choice_index)
)]
async fn choose(
    State(state): State<AppState>,
    Json(request): Json<ChooseRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::ApplyChoice {
        correlation_id: Uuid::new_v4(),
        user_id: request.user_id,
        scene_key: request.scene_key,
        choice_index: request.choice_index,
    };

    info!(correlation_id = %command.correlation_id, "handling apply_choice command");

    let outcome = command_handlers::handle_apply_choice(&command, &state.sessions).await?;
    if !outcome.report.is_fully_persisted() {
        warn!(
            correlation_id = %command.correlation_id,
            failures = outcome.report.failures.len(),
            "choice applied with persistence failures"
        );
    }

    Ok(Json(CommandResponse::from(outcome)))
}

/// POST /game/restart
#[instrument(skip(state, request), fields(user_id = %request.user_id))]
async fn restart(
    State(state): State<AppState>,
    Json(request): Json<PlayerRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::RestartStory {
        correlation_id: Uuid::new_v4(),
        user_id: request.user_id,
    };

    info!(correlation_id = %command.correlation_id, "handling restart command");

    let outcome = command_handlers::handle_restart(&command, &state.sessions).await?;
    Ok(Json(CommandResponse::from(outcome)))
}

/// POST /game/save
#[instrument(skip(state, request), fields(user_id = %request.user_id))]
async fn save(
    State(state): State<AppState>,
    Json(request): Json<PlayerRequest>,
) -> Result<Json<SaveResponse>, ApiError> {
    let command = commands::SaveProgress {
        correlation_id: Uuid::new_v4(),
        user_id: request.user_id,
    };

    info!(correlation_id = %command.correlation_id, "handling save_progress command");

    let outcome = command_handlers::handle_save_progress(&command, &state.sessions).await?;
    Ok(Json(SaveResponse::from(outcome)))
}

/// Returns the router for game play.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/game/choose", post(choose))
        .route("/game/restart", post(restart))
        .route("/game/save", post(save))
        .route("/game/{user_id}", get(get_game))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::{TimeZone, Utc};
    use serde_json::Value;
    use storyweave_core::ports::{ChoiceRecord, ProfileStore, SceneRecord, StoryRepository};
    use storyweave_story::application::context::GameContext;
    use storyweave_test_support::{
        FailingStoryRepository, FixedClock, InMemoryProfileStore, InMemoryScoreLedger,
        InMemoryStoryRepository, RecordingAchievementService,
    };
    use tower::ServiceExt;

    fn records() -> Vec<SceneRecord> {
        vec![
            SceneRecord {
                key: "start".to_owned(),
                text: "A quiet meadow.".to_owned(),
                score_delta: None,
                grants_item: None,
                grants_achievement: None,
                choices: vec![
                    ChoiceRecord {
                        text: "Walk on".to_owned(),
                        target_scene_key: "endGame".to_owned(),
                        required_item: None,
                        required_score: None,
                    },
                    ChoiceRecord {
                        text: "Open the chest".to_owned(),
                        target_scene_key: "endGame".to_owned(),
                        required_item: Some("key".to_owned()),
                        required_score: None,
                    },
                ],
            },
            SceneRecord {
                key: "endGame".to_owned(),
                text: "The end.".to_owned(),
                score_delta: Some(20),
                grants_item: None,
                grants_achievement: None,
                choices: vec![],
            },
        ]
    }

    fn app_state_with(
        stories: Arc<dyn StoryRepository>,
        profiles: Arc<dyn ProfileStore>,
    ) -> AppState {
        AppState::new(GameContext::new(
            stories,
            profiles,
            Arc::new(RecordingAchievementService::new()),
            Arc::new(InMemoryScoreLedger::new()),
            Arc::new(FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap())),
        ))
    }

    fn test_app_state() -> AppState {
        app_state_with(
            Arc::new(InMemoryStoryRepository::new(records())),
            Arc::new(InMemoryProfileStore::new()),
        )
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body_bytes).unwrap_or(Value::Null))
    }

    fn post(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_get_game_returns_start_scene_for_new_player() {
        // Arrange
        let app = router().with_state(test_app_state());
        let user_id = Uuid::new_v4();
        let request = Request::builder()
            .uri(format!("/game/{user_id}"))
            .body(Body::empty())
            .unwrap();

        // Act
        let (status, json) = send(app, request).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["scene_key"], "start");
        assert_eq!(json["choices"][0]["disabled"], false);
        assert_eq!(json["choices"][1]["disabled"], true);
        assert_eq!(json["choices"][1]["reason"], "You need the 'key' item.");
    }

    #[tokio::test]
    async fn test_choose_returns_event_ids_and_new_state() {
        // Arrange
        let app = router().with_state(test_app_state());
        let body = serde_json::json!({
            "user_id": Uuid::new_v4(),
            "scene_key": "start",
            "choice_index": 0
        });

        // Act
        let (status, json) = send(app, post("/game/choose", &body)).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["state"]["scene_key"], "endGame");
        assert_eq!(json["state"]["ended"], true);
        assert_eq!(json["high_score"]["new_high_score"], true);
        assert!(json["warnings"].as_array().unwrap().is_empty());
        for id in json["event_ids"].as_array().unwrap() {
            Uuid::parse_str(id.as_str().unwrap()).unwrap();
        }
    }

    #[tokio::test]
    async fn test_choose_disabled_choice_returns_409() {
        // Arrange
        let app = router().with_state(test_app_state());
        let body = serde_json::json!({
            "user_id": Uuid::new_v4(),
            "scene_key": "start",
            "choice_index": 1
        });

        // Act
        let (status, json) = send(app, post("/game/choose", &body)).await;

        // Assert
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"], "invalid_transition");
    }

    #[tokio::test]
    async fn test_choose_reports_save_failure_as_warning() {
        // Arrange
        let state = app_state_with(
            Arc::new(InMemoryStoryRepository::new(records())),
            Arc::new(InMemoryProfileStore::new().failing_saves()),
        );
        let app = router().with_state(state);
        let body = serde_json::json!({
            "user_id": Uuid::new_v4(),
            "scene_key": "start",
            "choice_index": 0
        });

        // Act
        let (status, json) = send(app, post("/game/choose", &body)).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["state"]["scene_key"], "endGame");
        assert_eq!(json["warnings"][0]["target"], "profile");
    }

    #[tokio::test]
    async fn test_choose_returns_422_for_missing_fields() {
        // Arrange
        let app = router().with_state(test_app_state());

        // Act
        let (status, _) = send(app, post("/game/choose", &serde_json::json!({}))).await;

        // Assert
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_restart_returns_start_state() {
        // Arrange
        let app = router().with_state(test_app_state());
        let body = serde_json::json!({ "user_id": Uuid::new_v4() });

        // Act
        let (status, json) = send(app, post("/game/restart", &body)).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["state"]["scene_key"], "start");
        assert_eq!(json["state"]["score"], 0);
        assert_eq!(json["event_ids"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_save_with_nothing_pending_reports_not_saved() {
        // Arrange
        let app = router().with_state(test_app_state());
        let body = serde_json::json!({ "user_id": Uuid::new_v4() });

        // Act
        let (status, json) = send(app, post("/game/save", &body)).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["saved"], false);
        assert_eq!(json["state"]["scene_key"], "start");
    }

    #[tokio::test]
    async fn test_get_game_returns_500_when_story_fetch_fails() {
        // Arrange
        let state = app_state_with(
            Arc::new(FailingStoryRepository),
            Arc::new(InMemoryProfileStore::new()),
        );
        let app = router().with_state(state);
        let request = Request::builder()
            .uri(format!("/game/{}", Uuid::new_v4()))
            .body(Body::empty())
            .unwrap();

        // Act
        let (status, json) = send(app, request).await;

        // Assert
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "infrastructure_error");
    }

    #[tokio::test]
    async fn test_get_game_returns_500_for_malformed_story() {
        // Arrange
        let mut broken = records();
        broken[0].choices[0].target_scene_key = "nowhere".to_owned();
        let state = app_state_with(
            Arc::new(InMemoryStoryRepository::new(broken)),
            Arc::new(InMemoryProfileStore::new()),
        );
        let app = router().with_state(state);
        let request = Request::builder()
            .uri(format!("/game/{}", Uuid::new_v4()))
            .body(Body::empty())
            .unwrap();

        // Act
        let (status, json) = send(app, request).await;

        // Assert
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "structural_data_error");
    }
}

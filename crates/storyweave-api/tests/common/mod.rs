//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use storyweave_core::clock::Clock;
use storyweave_core::ports::{ChoiceRecord, SceneRecord};
use storyweave_story::application::context::GameContext;
use storyweave_test_support::{
    FixedClock, InMemoryProfileStore, InMemoryScoreLedger, InMemoryStoryRepository,
    RecordingAchievementService,
};
use tower::ServiceExt;

use storyweave_api::state::AppState;

/// Fixed timestamp used across all integration tests.
fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(
        chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 1, 15, 10, 0, 0).unwrap(),
    ))
}

fn choice(text: &str, target: &str) -> ChoiceRecord {
    ChoiceRecord {
        text: text.to_owned(),
        target_scene_key: target.to_owned(),
        required_item: None,
        required_score: None,
    }
}

fn scene(key: &str, choices: Vec<ChoiceRecord>) -> SceneRecord {
    SceneRecord {
        key: key.to_owned(),
        text: format!("The {key} scene."),
        score_delta: None,
        grants_item: None,
        grants_achievement: None,
        choices,
    }
}

/// `start -> shed (+30, key) -> gate`, where gate offers `vault` (requires
/// key and 50 score) and `practice` (+20, back to gate). `vault` leads to
/// `endGame`, whose only choice restarts.
pub fn test_story() -> Vec<SceneRecord> {
    let mut shed = scene("shed", vec![choice("Walk to the gate", "gate")]);
    shed.score_delta = Some(30);
    shed.grants_item = Some("key".to_owned());

    let mut vault_choice = choice("Open the vault", "vault");
    vault_choice.required_item = Some("key".to_owned());
    vault_choice.required_score = Some(50);
    let gate = scene(
        "gate",
        vec![
            vault_choice,
            choice("Practice lockpicking", "practice"),
        ],
    );

    let mut practice = scene("practice", vec![choice("Return to the gate", "gate")]);
    practice.score_delta = Some(20);

    let mut vault = scene("vault", vec![choice("Leave", "endGame")]);
    vault.grants_achievement = Some("VAULT_OPENED".to_owned());

    vec![
        scene("start", vec![choice("Search the shed", "shed")]),
        shed,
        gate,
        practice,
        vault,
        scene("endGame", vec![choice("Play again", "start")]),
    ]
}

/// In-memory collaborators and live sessions shared by one test.
pub struct TestBackend {
    pub profiles: Arc<InMemoryProfileStore>,
    pub achievements: Arc<RecordingAchievementService>,
    pub scores: Arc<InMemoryScoreLedger>,
    state: AppState,
}

impl TestBackend {
    pub fn new() -> Self {
        Self::with(
            InMemoryProfileStore::new(),
            RecordingAchievementService::new(),
            InMemoryScoreLedger::new(),
        )
    }

    pub fn with(
        profiles: InMemoryProfileStore,
        achievements: RecordingAchievementService,
        scores: InMemoryScoreLedger,
    ) -> Self {
        let profiles = Arc::new(profiles);
        let achievements = Arc::new(achievements);
        let scores = Arc::new(scores);
        let game = GameContext::new(
            Arc::new(InMemoryStoryRepository::new(test_story())),
            profiles.clone(),
            achievements.clone(),
            scores.clone(),
            fixed_clock(),
        );
        Self {
            profiles,
            achievements,
            scores,
            state: AppState::new(game),
        }
    }

    /// Build the full app router over these collaborators. Uses the same
    /// route structure as `main.rs`; every router shares the backend's live
    /// sessions.
    pub fn app(&self) -> Router {
        storyweave_api::app(self.state.clone())
    }
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

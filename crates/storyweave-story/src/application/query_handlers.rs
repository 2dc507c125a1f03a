//! Query handlers for story traversal.
//!
//! These read a player's live session and return read-only view DTOs.

use serde::Serialize;
use uuid::Uuid;

use storyweave_core::error::DomainError;

use crate::application::sessions::SessionRegistry;
use crate::domain::engine::StoryEngine;

/// One choice of the current scene as presented to the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceView {
    /// Index to submit when picking this choice.
    pub index: usize,
    /// Display text.
    pub text: String,
    /// Scene the choice leads to.
    pub target_scene_key: String,
    /// Whether the choice is currently unavailable.
    pub disabled: bool,
    /// Human-readable reason the choice is unavailable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Read-only view of a player's game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameStateView {
    /// The player.
    pub user_id: Uuid,
    /// Current scene key.
    pub scene_key: String,
    /// Current scene text.
    pub scene_text: String,
    /// Cumulative score.
    pub score: i64,
    /// Held items, sorted.
    pub inventory: Vec<String>,
    /// Whether the current scene is terminal.
    pub ended: bool,
    /// The current scene's choices in declared order.
    pub choices: Vec<ChoiceView>,
    /// Accepted transitions in this session.
    pub revision: u64,
    /// Fingerprint of the loaded story graph.
    pub story_fingerprint: String,
}

/// Builds the view of an engine's current state.
#[must_use]
pub fn game_state_view(engine: &StoryEngine) -> GameStateView {
    let scene = engine.current_scene();
    GameStateView {
        user_id: engine.user_id(),
        scene_key: scene.key.clone(),
        scene_text: scene.text.clone(),
        score: engine.score(),
        inventory: engine.inventory().to_vec(),
        ended: engine.is_ended(),
        choices: engine
            .available_choices()
            .into_iter()
            .map(|available| ChoiceView {
                index: available.index,
                disabled: available.disabled(),
                reason: available.reason.map(|r| r.to_string()),
                text: available.choice.text,
                target_scene_key: available.choice.target,
            })
            .collect(),
        revision: engine.revision(),
        story_fingerprint: engine.graph().fingerprint().to_owned(),
    }
}

/// Returns the current state of a player's live session, loading it first
/// if needed.
///
/// Players with no saved progress are shown the start scene.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the story or progress cannot be
/// fetched, or `DomainError::Structural` if the story is malformed.
pub async fn get_game_state(
    user_id: Uuid,
    sessions: &SessionRegistry,
) -> Result<GameStateView, DomainError> {
    let session = sessions.checkout(user_id).await?;
    Ok(game_state_view(session.loaded_engine()?))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use storyweave_core::error::DomainError;
    use storyweave_core::ports::{ChoiceRecord, SavedProgress, SceneRecord};
    use storyweave_test_support::{
        FailingStoryRepository, FixedClock, InMemoryProfileStore, InMemoryScoreLedger,
        InMemoryStoryRepository, RecordingAchievementService,
    };
    use uuid::Uuid;

    use super::get_game_state;
    use crate::application::context::GameContext;
    use crate::application::sessions::SessionRegistry;

    fn records() -> Vec<SceneRecord> {
        vec![
            SceneRecord {
                key: "start".to_owned(),
                text: "A fork in the road.".to_owned(),
                score_delta: None,
                grants_item: None,
                grants_achievement: None,
                choices: vec![
                    ChoiceRecord {
                        text: "Take the left path".to_owned(),
                        target_scene_key: "left".to_owned(),
                        required_item: None,
                        required_score: None,
                    },
                    ChoiceRecord {
                        text: "Unlock the gate".to_owned(),
                        target_scene_key: "endGame".to_owned(),
                        required_item: Some("key".to_owned()),
                        required_score: None,
                    },
                ],
            },
            SceneRecord {
                key: "left".to_owned(),
                text: "A dead end.".to_owned(),
                score_delta: Some(5),
                grants_item: None,
                grants_achievement: None,
                choices: vec![],
            },
            SceneRecord {
                key: "endGame".to_owned(),
                text: "The end.".to_owned(),
                score_delta: None,
                grants_item: None,
                grants_achievement: None,
                choices: vec![],
            },
        ]
    }

    fn sessions(profiles: InMemoryProfileStore) -> SessionRegistry {
        SessionRegistry::new(GameContext::new(
            Arc::new(InMemoryStoryRepository::new(records())),
            Arc::new(profiles),
            Arc::new(RecordingAchievementService::new()),
            Arc::new(InMemoryScoreLedger::new()),
            Arc::new(FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap())),
        ))
    }

    #[tokio::test]
    async fn test_get_game_state_for_new_player_shows_start_scene() {
        // Arrange
        let user_id = Uuid::new_v4();
        let sessions = sessions(InMemoryProfileStore::new());

        // Act
        let view = get_game_state(user_id, &sessions).await.unwrap();

        // Assert
        assert_eq!(view.user_id, user_id);
        assert_eq!(view.scene_key, "start");
        assert_eq!(view.scene_text, "A fork in the road.");
        assert_eq!(view.score, 0);
        assert!(!view.ended);
        assert_eq!(view.choices.len(), 2);
        assert!(!view.choices[0].disabled);
        assert!(view.choices[1].disabled);
        assert_eq!(
            view.choices[1].reason.as_deref(),
            Some("You need the 'key' item.")
        );
        assert_eq!(view.story_fingerprint.len(), 64);
    }

    #[tokio::test]
    async fn test_get_game_state_reflects_saved_progress() {
        // Arrange
        let user_id = Uuid::new_v4();
        let profiles = InMemoryProfileStore::new().with_progress(
            user_id,
            SavedProgress {
                scene_key: "start".to_owned(),
                score: 12,
                inventory: vec!["key".to_owned()],
            },
        );
        let sessions = sessions(profiles);

        // Act
        let view = get_game_state(user_id, &sessions).await.unwrap();

        // Assert
        assert_eq!(view.score, 12);
        assert_eq!(view.inventory, vec!["key".to_owned()]);
        assert!(view.choices.iter().all(|c| !c.disabled));
    }

    #[tokio::test]
    async fn test_get_game_state_propagates_story_failure() {
        // Arrange
        let sessions = SessionRegistry::new(GameContext::new(
            Arc::new(FailingStoryRepository),
            Arc::new(InMemoryProfileStore::new()),
            Arc::new(RecordingAchievementService::new()),
            Arc::new(InMemoryScoreLedger::new()),
            Arc::new(FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap())),
        ));

        // Act
        let result = get_game_state(Uuid::new_v4(), &sessions).await;

        // Assert
        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
    }
}

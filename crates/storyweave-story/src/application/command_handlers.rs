//! Command handlers for story traversal.
//!
//! Each handler checks out the player's live session, executes the command,
//! and lets the session dispatch the resulting events to the collaborators.

use storyweave_core::command::Command;
use storyweave_core::error::DomainError;
use tracing::{info, warn};

use crate::application::query_handlers::{GameStateView, game_state_view};
use crate::application::session::{GameSession, TransitionReport};
use crate::application::sessions::SessionRegistry;
use crate::domain::commands::{ApplyChoice, RestartStory, SaveProgress};

/// The result of a handled command.
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    /// Side effects and their persistence status.
    pub report: TransitionReport,
    /// The player's state after the command.
    pub state: GameStateView,
}

/// The result of a save retry.
#[derive(Debug, Clone)]
pub struct SaveOutcome {
    /// Whether unsaved progress was written; `false` when nothing was pending.
    pub saved: bool,
    /// The player's state.
    pub state: GameStateView,
}

fn outcome(session: &GameSession, report: TransitionReport) -> Result<CommandOutcome, DomainError> {
    Ok(CommandOutcome {
        report,
        state: game_state_view(session.loaded_engine()?),
    })
}

/// Handles the `ApplyChoice` command: applies the choice to the player's live
/// session and dispatches the resulting events.
///
/// # Errors
///
/// Returns `DomainError::InvalidTransition` if the choice is rejected, or the
/// load error if the story or progress cannot be fetched.
pub async fn handle_apply_choice(
    command: &ApplyChoice,
    sessions: &SessionRegistry,
) -> Result<CommandOutcome, DomainError> {
    let mut session = sessions.checkout(command.user_id()).await?;
    let report = session
        .choose(&command.scene_key, command.choice_index, command.correlation_id)
        .await?;

    info!(
        correlation_id = %command.correlation_id,
        user_id = %command.user_id,
        command_type = command.command_type(),
        events = report.events.len(),
        failures = report.failures.len(),
        "choice applied"
    );
    outcome(&session, report)
}

/// Handles the `RestartStory` command: resets the player's live session to
/// the start scene and saves the reset progress.
///
/// # Errors
///
/// Returns the load error if the story or progress cannot be fetched.
pub async fn handle_restart(
    command: &RestartStory,
    sessions: &SessionRegistry,
) -> Result<CommandOutcome, DomainError> {
    let mut session = sessions.checkout(command.user_id()).await?;
    let report = session.restart(command.correlation_id).await?;

    info!(
        correlation_id = %command.correlation_id,
        user_id = %command.user_id,
        command_type = command.command_type(),
        "story restarted"
    );
    outcome(&session, report)
}

/// Handles the `SaveProgress` command: writes the live session's progress
/// if its last save failed.
///
/// # Errors
///
/// Returns the profile store's error if the save fails again, or the load
/// error if the session cannot be loaded.
pub async fn handle_save_progress(
    command: &SaveProgress,
    sessions: &SessionRegistry,
) -> Result<SaveOutcome, DomainError> {
    let mut session = sessions.checkout(command.user_id()).await?;
    let saved = session.retry_save().await.inspect_err(|e| {
        warn!(
            correlation_id = %command.correlation_id,
            user_id = %command.user_id,
            error = %e,
            "progress save retry failed"
        );
    })?;

    info!(
        correlation_id = %command.correlation_id,
        user_id = %command.user_id,
        command_type = command.command_type(),
        saved,
        "progress save retried"
    );
    Ok(SaveOutcome {
        saved,
        state: game_state_view(session.loaded_engine()?),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use storyweave_core::error::DomainError;
    use storyweave_core::ports::{ChoiceRecord, SavedProgress, SceneRecord};
    use storyweave_test_support::{
        FixedClock, InMemoryProfileStore, InMemoryScoreLedger, InMemoryStoryRepository,
        RecordingAchievementService,
    };
    use uuid::Uuid;

    use super::{handle_apply_choice, handle_restart, handle_save_progress};
    use crate::application::context::GameContext;
    use crate::application::sessions::SessionRegistry;
    use crate::domain::commands::{ApplyChoice, RestartStory, SaveProgress};
    use crate::domain::engine::{GAME_START_ACHIEVEMENT, Transition};

    /// `start -> cave (+15, torch) -> endGame`.
    fn records() -> Vec<SceneRecord> {
        let choice = |target: &str| ChoiceRecord {
            text: format!("Go to {target}"),
            target_scene_key: target.to_owned(),
            required_item: None,
            required_score: None,
        };
        vec![
            SceneRecord {
                key: "start".to_owned(),
                text: "The forest edge.".to_owned(),
                score_delta: None,
                grants_item: None,
                grants_achievement: None,
                choices: vec![choice("cave")],
            },
            SceneRecord {
                key: "cave".to_owned(),
                text: "A dark cave.".to_owned(),
                score_delta: Some(15),
                grants_item: Some("torch".to_owned()),
                grants_achievement: None,
                choices: vec![choice("endGame")],
            },
            SceneRecord {
                key: "endGame".to_owned(),
                text: "Daylight.".to_owned(),
                score_delta: None,
                grants_item: None,
                grants_achievement: None,
                choices: vec![],
            },
        ]
    }

    struct Fixture {
        profiles: Arc<InMemoryProfileStore>,
        achievements: Arc<RecordingAchievementService>,
        scores: Arc<InMemoryScoreLedger>,
    }

    impl Fixture {
        fn new(profiles: InMemoryProfileStore) -> Self {
            Self {
                profiles: Arc::new(profiles),
                achievements: Arc::new(RecordingAchievementService::new()),
                scores: Arc::new(InMemoryScoreLedger::new()),
            }
        }

        fn sessions(&self) -> SessionRegistry {
            SessionRegistry::new(GameContext::new(
                Arc::new(InMemoryStoryRepository::new(records())),
                self.profiles.clone(),
                self.achievements.clone(),
                self.scores.clone(),
                Arc::new(FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap())),
            ))
        }
    }

    #[tokio::test]
    async fn test_handle_apply_choice_advances_and_persists() {
        // Arrange
        let user_id = Uuid::new_v4();
        let fixture = Fixture::new(InMemoryProfileStore::new());
        let command = ApplyChoice {
            correlation_id: Uuid::new_v4(),
            user_id,
            scene_key: "start".to_owned(),
            choice_index: 0,
        };

        // Act
        let outcome = handle_apply_choice(&command, &fixture.sessions())
            .await
            .unwrap();

        // Assert
        assert_eq!(outcome.state.scene_key, "cave");
        assert_eq!(outcome.state.score, 15);
        assert_eq!(outcome.state.inventory, vec!["torch".to_owned()]);
        assert!(outcome.report.is_fully_persisted());
        assert_eq!(
            outcome.report.unlocked_achievements,
            vec![GAME_START_ACHIEVEMENT.to_owned()]
        );
        assert_eq!(fixture.profiles.saved(user_id).unwrap().scene_key, "cave");
        for event in &outcome.report.events {
            assert_eq!(event.metadata.correlation_id, command.correlation_id);
        }
    }

    #[tokio::test]
    async fn test_handle_apply_choice_to_end_submits_score() {
        // Arrange
        let user_id = Uuid::new_v4();
        let fixture = Fixture::new(InMemoryProfileStore::new().with_progress(
            user_id,
            SavedProgress {
                scene_key: "cave".to_owned(),
                score: 15,
                inventory: vec!["torch".to_owned()],
            },
        ));
        let command = ApplyChoice {
            correlation_id: Uuid::new_v4(),
            user_id,
            scene_key: "cave".to_owned(),
            choice_index: 0,
        };

        // Act
        let outcome = handle_apply_choice(&command, &fixture.sessions())
            .await
            .unwrap();

        // Assert
        assert!(outcome.state.ended);
        assert!(outcome.state.choices.is_empty());
        assert!(outcome.report.high_score.unwrap().new_high_score);
        assert_eq!(fixture.scores.best(user_id), Some(15));
    }

    #[tokio::test]
    async fn test_handle_apply_choice_rejects_stale_scene() {
        // Arrange
        let fixture = Fixture::new(InMemoryProfileStore::new());
        let command = ApplyChoice {
            correlation_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            scene_key: "cave".to_owned(),
            choice_index: 0,
        };

        // Act
        let result = handle_apply_choice(&command, &fixture.sessions()).await;

        // Assert
        assert!(matches!(result, Err(DomainError::InvalidTransition(_))));
        assert_eq!(fixture.profiles.save_count(), 0);
    }

    #[tokio::test]
    async fn test_handle_restart_resets_saved_progress() {
        // Arrange
        let user_id = Uuid::new_v4();
        let fixture = Fixture::new(InMemoryProfileStore::new().with_progress(
            user_id,
            SavedProgress {
                scene_key: "cave".to_owned(),
                score: 15,
                inventory: vec!["torch".to_owned()],
            },
        ));
        let command = RestartStory {
            correlation_id: Uuid::new_v4(),
            user_id,
        };

        // Act
        let outcome = handle_restart(&command, &fixture.sessions()).await.unwrap();

        // Assert
        assert_eq!(outcome.report.transition, Transition::Restarted);
        assert_eq!(outcome.state.scene_key, "start");
        assert_eq!(outcome.state.score, 0);
        assert_eq!(
            fixture.profiles.saved(user_id),
            Some(SavedProgress {
                scene_key: "start".to_owned(),
                score: 0,
                inventory: Vec::new(),
            })
        );
    }

    #[tokio::test]
    async fn test_failed_save_keeps_live_state_for_next_choice() {
        // Arrange
        let user_id = Uuid::new_v4();
        let fixture = Fixture::new(InMemoryProfileStore::new().failing_saves());
        let sessions = fixture.sessions();
        let first = ApplyChoice {
            correlation_id: Uuid::new_v4(),
            user_id,
            scene_key: "start".to_owned(),
            choice_index: 0,
        };
        let outcome = handle_apply_choice(&first, &sessions).await.unwrap();
        assert_eq!(outcome.state.scene_key, "cave");
        assert!(!outcome.report.is_fully_persisted());
        fixture.profiles.set_failing_saves(false);

        // Act
        let second = ApplyChoice {
            correlation_id: Uuid::new_v4(),
            user_id,
            scene_key: "cave".to_owned(),
            choice_index: 0,
        };
        let outcome = handle_apply_choice(&second, &sessions).await.unwrap();

        // Assert
        assert_eq!(outcome.state.scene_key, "endGame");
        assert_eq!(outcome.state.score, 15);
        assert_eq!(outcome.state.revision, 2);
        assert!(outcome.report.is_fully_persisted());
        assert_eq!(fixture.profiles.saved(user_id).unwrap().scene_key, "endGame");
    }

    #[tokio::test]
    async fn test_handle_save_progress_retries_failed_save() {
        // Arrange
        let user_id = Uuid::new_v4();
        let fixture = Fixture::new(InMemoryProfileStore::new().failing_saves());
        let sessions = fixture.sessions();
        let choose = ApplyChoice {
            correlation_id: Uuid::new_v4(),
            user_id,
            scene_key: "start".to_owned(),
            choice_index: 0,
        };
        handle_apply_choice(&choose, &sessions).await.unwrap();
        let command = SaveProgress {
            correlation_id: Uuid::new_v4(),
            user_id,
        };

        // Act
        let still_failing = handle_save_progress(&command, &sessions).await;
        fixture.profiles.set_failing_saves(false);
        let retried = handle_save_progress(&command, &sessions).await.unwrap();
        let nothing_pending = handle_save_progress(&command, &sessions).await.unwrap();

        // Assert
        assert!(matches!(still_failing, Err(DomainError::Infrastructure(_))));
        assert!(retried.saved);
        assert_eq!(retried.state.scene_key, "cave");
        assert!(!nothing_pending.saved);
        assert_eq!(
            fixture.profiles.saved(user_id),
            Some(SavedProgress {
                scene_key: "cave".to_owned(),
                score: 15,
                inventory: vec!["torch".to_owned()],
            })
        );
    }
}

//! A single player's live game session.
//!
//! The session owns the engine, feeds it the collaborators from a
//! [`GameContext`], and dispatches the engine's events in order: progress
//! save, high-score submission, achievement grants. Collaborator write
//! failures are reported in the [`TransitionReport`] and never roll back
//! local state.

use std::sync::Arc;

use serde::Serialize;
use storyweave_core::error::DomainError;
use storyweave_core::event::DomainEvent;
use storyweave_core::ports::{SavedProgress, SceneRecord, UnlockedAchievement};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::application::context::GameContext;
use crate::domain::engine::{StoryEngine, Transition};
use crate::domain::events::{StoryEvent, StoryEventKind};
use crate::domain::graph::StoryGraph;

/// Which collaborator a failed write was aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistenceTarget {
    /// Progress save to the profile store.
    Profile,
    /// Achievement grant.
    Achievement,
    /// High-score submission.
    ScoreLedger,
}

/// A collaborator write that failed after local state already changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersistenceFailure {
    /// The collaborator.
    pub target: PersistenceTarget,
    /// The underlying error message.
    pub message: String,
}

/// Result of submitting a final score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighScoreSubmission {
    /// Score at the end of the run.
    pub final_score: i64,
    /// Terminal scene reached.
    pub ending_scene_key: String,
    /// Whether the ledger recorded it as a new best.
    pub new_high_score: bool,
}

/// Everything that happened as a result of one accepted transition.
#[derive(Debug, Clone)]
pub struct TransitionReport {
    /// The engine's transition outcome.
    pub transition: Transition,
    /// Events produced, in dispatch order.
    pub events: Vec<StoryEvent>,
    /// Achievements successfully granted.
    pub unlocked_achievements: Vec<String>,
    /// Score ledger result, if the run ended and the submission succeeded.
    pub high_score: Option<HighScoreSubmission>,
    /// Writes that failed.
    pub failures: Vec<PersistenceFailure>,
}

impl TransitionReport {
    /// Returns `true` if every side effect was persisted.
    #[must_use]
    pub fn is_fully_persisted(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Identifies one load request; see [`GameSession::begin_load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    revision: Option<u64>,
}

/// One player's game session.
#[derive(Debug)]
pub struct GameSession {
    user_id: Uuid,
    context: GameContext,
    engine: Option<StoryEngine>,
    load_generation: u64,
    confirmed_revision: Option<u64>,
}

impl GameSession {
    /// Creates an unloaded session.
    #[must_use]
    pub fn new(user_id: Uuid, context: GameContext) -> Self {
        Self {
            user_id,
            context,
            engine: None,
            load_generation: 0,
            confirmed_revision: None,
        }
    }

    /// The player.
    #[must_use]
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    /// The engine, once loaded.
    #[must_use]
    pub fn engine(&self) -> Option<&StoryEngine> {
        self.engine.as_ref()
    }

    /// The loaded engine.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the session has not been loaded.
    pub fn loaded_engine(&self) -> Result<&StoryEngine, DomainError> {
        self.engine
            .as_ref()
            .ok_or_else(|| DomainError::Validation("game session is not loaded".to_owned()))
    }

    fn loaded_engine_mut(&mut self) -> Result<&mut StoryEngine, DomainError> {
        self.engine
            .as_mut()
            .ok_or_else(|| DomainError::Validation("game session is not loaded".to_owned()))
    }

    /// Starts a load. Any earlier ticket becomes stale, as does this one if
    /// the engine's state changes before it completes.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.load_generation += 1;
        LoadTicket {
            generation: self.load_generation,
            revision: self.engine.as_ref().map(StoryEngine::revision),
        }
    }

    /// Completes a load with fetched data. Returns `false` and leaves the
    /// session untouched if the ticket is stale.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Structural` if the records do not form a valid
    /// graph.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        records: Vec<SceneRecord>,
        saved: Option<&SavedProgress>,
        unlocked: Vec<UnlockedAchievement>,
    ) -> Result<bool, DomainError> {
        let current_revision = self.engine.as_ref().map(StoryEngine::revision);
        if ticket.generation != self.load_generation || ticket.revision != current_revision {
            debug!(user_id = %self.user_id, "discarding stale load response");
            return Ok(false);
        }

        let graph = Arc::new(StoryGraph::from_records(records)?);
        let engine = StoryEngine::resume(self.user_id, graph, saved)
            .with_milestones(self.context.milestones.clone())
            .with_granted_achievements(unlocked.into_iter().map(|a| a.key));

        info!(
            user_id = %self.user_id,
            scene_key = %engine.position(),
            fingerprint = %engine.graph().fingerprint(),
            "game session loaded"
        );
        self.confirmed_revision = Some(engine.revision());
        self.engine = Some(engine);
        Ok(true)
    }

    /// Fetches the story, saved progress, and unlocked achievements, then
    /// builds the engine.
    ///
    /// A failure to list unlocked achievements is logged and treated as
    /// "none unlocked"; the service deduplicates grants anyway.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the story or progress cannot
    /// be fetched, or `DomainError::Structural` if the story is malformed.
    pub async fn load(&mut self) -> Result<(), DomainError> {
        let ticket = self.begin_load();
        let records = self.context.stories.fetch().await?;
        let saved = self.context.profiles.load(self.user_id).await?;
        let unlocked = match self.context.achievements.unlocked(self.user_id).await {
            Ok(unlocked) => unlocked,
            Err(e) => {
                warn!(user_id = %self.user_id, error = %e, "failed to list unlocked achievements");
                Vec::new()
            }
        };
        self.complete_load(ticket, records, saved.as_ref(), unlocked)?;
        Ok(())
    }

    /// Applies a choice and dispatches the resulting side effects.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the session is not loaded, or the
    /// engine's rejection (`InvalidTransition`, `Structural`). Collaborator
    /// write failures are reported in the returned report instead.
    pub async fn choose(
        &mut self,
        scene_key: &str,
        choice_index: usize,
        correlation_id: Uuid,
    ) -> Result<TransitionReport, DomainError> {
        let clock = Arc::clone(&self.context.clock);
        let engine = self.loaded_engine_mut()?;
        let transition = engine.apply_choice(scene_key, choice_index, correlation_id, clock.as_ref())?;
        let events = engine.take_uncommitted_events();
        Ok(self.dispatch(transition, events).await)
    }

    /// Restarts the story and saves the reset progress.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the session is not loaded.
    pub async fn restart(&mut self, correlation_id: Uuid) -> Result<TransitionReport, DomainError> {
        let clock = Arc::clone(&self.context.clock);
        let engine = self.loaded_engine_mut()?;
        let transition = engine.restart(correlation_id, clock.as_ref());
        let events = engine.take_uncommitted_events();
        Ok(self.dispatch(transition, events).await)
    }

    /// Records that the progress at `revision` was saved. Acknowledgements
    /// older than the newest confirmed one are ignored; returns whether this
    /// one was accepted.
    pub fn acknowledge_save(&mut self, revision: u64) -> bool {
        if self.confirmed_revision.is_some_and(|confirmed| confirmed >= revision) {
            debug!(user_id = %self.user_id, revision, "ignoring stale save acknowledgement");
            return false;
        }
        self.confirmed_revision = Some(revision);
        true
    }

    /// Returns `true` if the engine holds state newer than the last
    /// confirmed save.
    #[must_use]
    pub fn has_unsaved_progress(&self) -> bool {
        self.engine.as_ref().is_some_and(|engine| {
            self.confirmed_revision
                .is_none_or(|confirmed| confirmed < engine.revision())
        })
    }

    /// Saves the current progress again if it is unconfirmed. Returns
    /// `true` if a save was performed.
    ///
    /// # Errors
    ///
    /// Returns the profile store's error if the save fails again, or
    /// `DomainError::Validation` if the session is not loaded.
    pub async fn retry_save(&mut self) -> Result<bool, DomainError> {
        if !self.has_unsaved_progress() {
            return Ok(false);
        }
        let engine = self.loaded_engine()?;
        let revision = engine.revision();
        let progress = engine.progress();
        self.context.profiles.save(self.user_id, &progress).await?;
        self.acknowledge_save(revision);
        Ok(true)
    }

    async fn dispatch(&mut self, transition: Transition, events: Vec<StoryEvent>) -> TransitionReport {
        let mut unlocked_achievements = Vec::new();
        let mut high_score = None;
        let mut failures = Vec::new();

        for event in &events {
            debug!(
                user_id = %self.user_id,
                event_type = event.event_type(),
                payload = %event.to_payload(),
                "dispatching story event"
            );
            match &event.kind {
                StoryEventKind::ProgressChanged(payload) => {
                    let progress = SavedProgress {
                        scene_key: payload.scene_key.clone(),
                        score: payload.score,
                        inventory: payload.inventory.clone(),
                    };
                    match self.context.profiles.save(self.user_id, &progress).await {
                        Ok(()) => {
                            self.acknowledge_save(event.metadata.revision);
                        }
                        Err(e) => {
                            warn!(user_id = %self.user_id, error = %e, "failed to save progress");
                            failures.push(PersistenceFailure {
                                target: PersistenceTarget::Profile,
                                message: e.to_string(),
                            });
                        }
                    }
                }
                StoryEventKind::GameCompleted(payload) => {
                    match self
                        .context
                        .scores
                        .submit_if_higher(self.user_id, payload.final_score, &payload.ending_scene_key)
                        .await
                    {
                        Ok(new_high_score) => {
                            info!(
                                user_id = %self.user_id,
                                final_score = payload.final_score,
                                new_high_score,
                                "game completed"
                            );
                            high_score = Some(HighScoreSubmission {
                                final_score: payload.final_score,
                                ending_scene_key: payload.ending_scene_key.clone(),
                                new_high_score,
                            });
                        }
                        Err(e) => {
                            warn!(user_id = %self.user_id, error = %e, "failed to submit score");
                            failures.push(PersistenceFailure {
                                target: PersistenceTarget::ScoreLedger,
                                message: e.to_string(),
                            });
                        }
                    }
                }
                StoryEventKind::AchievementUnlocked(payload) => {
                    match self
                        .context
                        .achievements
                        .grant(self.user_id, &payload.achievement_key)
                        .await
                    {
                        Ok(()) => unlocked_achievements.push(payload.achievement_key.clone()),
                        Err(e) => {
                            warn!(
                                user_id = %self.user_id,
                                achievement_key = %payload.achievement_key,
                                error = %e,
                                "failed to grant achievement"
                            );
                            failures.push(PersistenceFailure {
                                target: PersistenceTarget::Achievement,
                                message: e.to_string(),
                            });
                        }
                    }
                }
            }
        }

        TransitionReport {
            transition,
            events,
            unlocked_achievements,
            high_score,
            failures,
        }
    }
}

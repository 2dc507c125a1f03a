//! The story traversal state machine.

use std::collections::HashSet;
use std::sync::Arc;

use storyweave_core::clock::Clock;
use storyweave_core::error::DomainError;
use storyweave_core::event::EventMetadata;
use storyweave_core::ports::SavedProgress;
use tracing::warn;
use uuid::Uuid;

use super::choices::{AvailableChoice, gate};
use super::events::{
    AchievementUnlocked, GameCompleted, ProgressChanged, StoryEvent, StoryEventKind,
};
use super::graph::{Choice, Scene, StoryGraph};
use super::inventory::Inventory;

/// Achievement granted on the first move away from the start scene.
pub const GAME_START_ACHIEVEMENT: &str = "GAME_START";

/// Achievement granted when the score first reaches 50.
pub const HIGH_SCORE_50_ACHIEVEMENT: &str = "HIGH_SCORE_50";

/// Achievements granted by rule rather than by a scene field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MilestoneRules {
    /// Granted on the first transition away from the start scene.
    pub first_move: Option<String>,
    /// `(threshold, key)` pairs granted when a transition takes the score
    /// from below `threshold` to at least `threshold`.
    pub score_thresholds: Vec<(i64, String)>,
}

impl MilestoneRules {
    /// Rules that grant nothing.
    #[must_use]
    pub fn none() -> Self {
        Self {
            first_move: None,
            score_thresholds: Vec::new(),
        }
    }
}

impl Default for MilestoneRules {
    fn default() -> Self {
        Self {
            first_move: Some(GAME_START_ACHIEVEMENT.to_owned()),
            score_thresholds: vec![(50, HIGH_SCORE_50_ACHIEVEMENT.to_owned())],
        }
    }
}

/// Outcome of an accepted transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Moved to a new scene.
    Advanced {
        /// The scene moved to.
        scene_key: String,
        /// Whether the new scene is terminal.
        ended: bool,
    },
    /// Reset to the start scene with defaults.
    Restarted,
}

impl Transition {
    /// Returns `true` for a restart.
    #[must_use]
    pub fn is_restart(&self) -> bool {
        matches!(self, Self::Restarted)
    }
}

/// One player's position in a story graph.
///
/// Decision logic is synchronous. Every accepted transition bumps the
/// revision and queues events in `uncommitted_events` for the caller to
/// dispatch. Rejected transitions change nothing.
#[derive(Debug)]
pub struct StoryEngine {
    user_id: Uuid,
    graph: Arc<StoryGraph>,
    position: String,
    score: i64,
    inventory: Inventory,
    ended: bool,
    revision: u64,
    granted_achievements: HashSet<String>,
    milestones: MilestoneRules,
    emitted: i64,
    uncommitted_events: Vec<StoryEvent>,
}

impl StoryEngine {
    /// Creates an engine at the start scene with default state.
    #[must_use]
    pub fn new(user_id: Uuid, graph: Arc<StoryGraph>) -> Self {
        let position = graph.start_key().to_owned();
        let ended = graph.is_terminal(&position);
        Self {
            user_id,
            graph,
            position,
            score: 0,
            inventory: Inventory::new(),
            ended,
            revision: 0,
            granted_achievements: HashSet::new(),
            milestones: MilestoneRules::default(),
            emitted: 0,
            uncommitted_events: Vec::new(),
        }
    }

    /// Creates an engine from saved progress.
    ///
    /// If the saved scene no longer exists in the graph, the position falls
    /// back to the start scene; score and inventory are kept.
    #[must_use]
    pub fn resume(user_id: Uuid, graph: Arc<StoryGraph>, saved: Option<&SavedProgress>) -> Self {
        let mut engine = Self::new(user_id, graph);
        let Some(saved) = saved else {
            return engine;
        };

        if engine.graph.contains(&saved.scene_key) {
            engine.position.clone_from(&saved.scene_key);
        } else {
            warn!(
                user_id = %user_id,
                scene_key = %saved.scene_key,
                "saved scene is not in the story graph; resuming at start"
            );
        }
        engine.score = saved.score;
        engine.inventory = saved.inventory.iter().cloned().collect();
        engine.ended = engine.graph.is_terminal(&engine.position);
        engine
    }

    /// Replaces the milestone rules.
    #[must_use]
    pub fn with_milestones(mut self, milestones: MilestoneRules) -> Self {
        self.milestones = milestones;
        self
    }

    /// Marks achievements as already granted so they are not emitted again.
    #[must_use]
    pub fn with_granted_achievements<I>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        self.granted_achievements.extend(keys);
        self
    }

    /// The player driving this engine.
    #[must_use]
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    /// The loaded graph.
    #[must_use]
    pub fn graph(&self) -> &StoryGraph {
        &self.graph
    }

    /// Current scene key.
    #[must_use]
    pub fn position(&self) -> &str {
        &self.position
    }

    /// The current scene.
    #[must_use]
    pub fn current_scene(&self) -> &Scene {
        self.graph
            .scene(&self.position)
            .unwrap_or_else(|| self.graph.start_scene())
    }

    /// Cumulative score.
    #[must_use]
    pub fn score(&self) -> i64 {
        self.score
    }

    /// Held items.
    #[must_use]
    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Whether the current scene is terminal.
    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Number of accepted transitions and restarts.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Snapshot of the state the profile store should hold.
    #[must_use]
    pub fn progress(&self) -> SavedProgress {
        SavedProgress {
            scene_key: self.position.clone(),
            score: self.score,
            inventory: self.inventory.to_vec(),
        }
    }

    /// The current scene's choices in declared order, each with its
    /// availability.
    #[must_use]
    pub fn available_choices(&self) -> Vec<AvailableChoice> {
        self.current_scene()
            .choices
            .iter()
            .enumerate()
            .map(|(index, choice)| AvailableChoice {
                index,
                choice: choice.clone(),
                reason: gate(choice, self.score, &self.inventory),
            })
            .collect()
    }

    /// Applies the choice at `choice_index` of scene `scene_key`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` without changing state if
    /// `scene_key` is not the current scene, the index is out of range, the
    /// choice is disabled, or the score would overflow. Returns
    /// `DomainError::Structural` if the target scene cannot be resolved.
    pub fn apply_choice(
        &mut self,
        scene_key: &str,
        choice_index: usize,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<Transition, DomainError> {
        if scene_key != self.position {
            return Err(DomainError::InvalidTransition(format!(
                "choice belongs to scene '{scene_key}' but the current scene is '{}'",
                self.position
            )));
        }
        let choice = self
            .current_scene()
            .choices
            .get(choice_index)
            .cloned()
            .ok_or_else(|| {
                DomainError::InvalidTransition(format!(
                    "scene '{scene_key}' has no choice {choice_index}"
                ))
            })?;
        if let Some(reason) = gate(&choice, self.score, &self.inventory) {
            return Err(DomainError::InvalidTransition(format!(
                "choice {choice_index} of scene '{scene_key}' is disabled: {reason}"
            )));
        }

        if self.is_restart_choice(&choice) {
            self.reset(correlation_id, clock);
            return Ok(Transition::Restarted);
        }

        let graph = Arc::clone(&self.graph);
        let target = graph.scene(&choice.target).ok_or_else(|| {
            DomainError::Structural(format!("choice target '{}' does not resolve", choice.target))
        })?;
        let previous_score = self.score;
        let score = previous_score
            .checked_add(target.score_delta.unwrap_or(0))
            .ok_or_else(|| DomainError::InvalidTransition("score overflow".to_owned()))?;
        let left_start = self.position == graph.start_key();

        self.position.clone_from(&target.key);
        self.score = score;
        if let Some(item) = &target.grants_item {
            self.inventory.grant(item.as_str());
        }
        self.ended = graph.is_terminal(&target.key);
        self.revision += 1;

        self.record_progress(false, correlation_id, clock);
        if self.ended {
            self.record(
                StoryEventKind::GameCompleted(GameCompleted {
                    final_score: self.score,
                    ending_scene_key: self.position.clone(),
                }),
                correlation_id,
                clock,
            );
        }

        let mut earned: Vec<String> = target.grants_achievement.iter().cloned().collect();
        if left_start {
            earned.extend(self.milestones.first_move.iter().cloned());
        }
        earned.extend(
            self.milestones
                .score_thresholds
                .iter()
                .filter(|(threshold, _)| previous_score < *threshold && score >= *threshold)
                .map(|(_, key)| key.clone()),
        );
        for key in earned {
            self.grant_achievement(key, correlation_id, clock);
        }

        Ok(Transition::Advanced {
            scene_key: self.position.clone(),
            ended: self.ended,
        })
    }

    /// Resets to the start scene with zero score and an empty inventory.
    pub fn restart(&mut self, correlation_id: Uuid, clock: &dyn Clock) -> Transition {
        self.reset(correlation_id, clock);
        Transition::Restarted
    }

    /// A choice leading back to the start scene restarts the run instead of
    /// navigating there.
    // Open question whether this overload was intended; kept as observed.
    fn is_restart_choice(&self, choice: &Choice) -> bool {
        choice.target == self.graph.start_key()
    }

    fn reset(&mut self, correlation_id: Uuid, clock: &dyn Clock) {
        self.position = self.graph.start_key().to_owned();
        self.score = 0;
        self.inventory = Inventory::new();
        self.ended = false;
        self.revision += 1;
        self.record_progress(true, correlation_id, clock);
    }

    fn grant_achievement(&mut self, key: String, correlation_id: Uuid, clock: &dyn Clock) {
        if self.granted_achievements.insert(key.clone()) {
            self.record(
                StoryEventKind::AchievementUnlocked(AchievementUnlocked {
                    achievement_key: key,
                }),
                correlation_id,
                clock,
            );
        }
    }

    fn record_progress(&mut self, restarted: bool, correlation_id: Uuid, clock: &dyn Clock) {
        self.record(
            StoryEventKind::ProgressChanged(ProgressChanged {
                scene_key: self.position.clone(),
                score: self.score,
                inventory: self.inventory.to_vec(),
                restarted,
            }),
            correlation_id,
            clock,
        );
    }

    fn record(&mut self, kind: StoryEventKind, correlation_id: Uuid, clock: &dyn Clock) {
        self.emitted += 1;
        let event = StoryEvent {
            metadata: EventMetadata {
                event_id: Uuid::new_v4(),
                event_type: kind.event_type().to_owned(),
                user_id: self.user_id,
                sequence_number: self.emitted,
                revision: self.revision,
                correlation_id,
                occurred_at: clock.now(),
            },
            kind,
        };
        self.uncommitted_events.push(event);
    }

    /// Events produced since the last `take_uncommitted_events`.
    #[must_use]
    pub fn uncommitted_events(&self) -> &[StoryEvent] {
        &self.uncommitted_events
    }

    /// Drains the pending events for dispatch.
    pub fn take_uncommitted_events(&mut self) -> Vec<StoryEvent> {
        std::mem::take(&mut self.uncommitted_events)
    }
}

//! Domain events emitted by the story engine.
//!
//! Each accepted transition produces a `ProgressChanged` event for the
//! profile store, followed by an optional `GameCompleted` for the score
//! ledger and zero or more `AchievementUnlocked` events.

use serde::{Deserialize, Serialize};
use storyweave_core::event::{DomainEvent, EventMetadata};

/// The player's progress changed and should be saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressChanged {
    /// New current scene.
    pub scene_key: String,
    /// New cumulative score.
    pub score: i64,
    /// Held items, sorted.
    pub inventory: Vec<String>,
    /// `true` when the change was a restart.
    pub restarted: bool,
}

/// The player reached a terminal scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameCompleted {
    /// Score at the end of the run.
    pub final_score: i64,
    /// The terminal scene reached.
    pub ending_scene_key: String,
}

/// The player earned an achievement for the first time in this session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementUnlocked {
    /// The achievement key.
    pub achievement_key: String,
}

/// Event type identifier for [`ProgressChanged`].
pub const PROGRESS_CHANGED_EVENT_TYPE: &str = "story.progress_changed";

/// Event type identifier for [`GameCompleted`].
pub const GAME_COMPLETED_EVENT_TYPE: &str = "story.game_completed";

/// Event type identifier for [`AchievementUnlocked`].
pub const ACHIEVEMENT_UNLOCKED_EVENT_TYPE: &str = "story.achievement_unlocked";

/// Event payload variants for story traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoryEventKind {
    /// Progress should be persisted.
    ProgressChanged(ProgressChanged),
    /// A run has ended.
    GameCompleted(GameCompleted),
    /// An achievement was earned.
    AchievementUnlocked(AchievementUnlocked),
}

/// Domain event envelope for story traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: StoryEventKind,
}

impl StoryEventKind {
    /// The type name for this payload.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ProgressChanged(_) => PROGRESS_CHANGED_EVENT_TYPE,
            Self::GameCompleted(_) => GAME_COMPLETED_EVENT_TYPE,
            Self::AchievementUnlocked(_) => ACHIEVEMENT_UNLOCKED_EVENT_TYPE,
        }
    }
}

impl DomainEvent for StoryEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("StoryEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}

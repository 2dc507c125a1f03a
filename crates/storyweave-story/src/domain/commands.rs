//! Commands for story traversal.

use storyweave_core::command::Command;
use uuid::Uuid;

/// Command to pick a choice of the current scene.
#[derive(Debug, Clone)]
pub struct ApplyChoice {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The player.
    pub user_id: Uuid,
    /// Scene the client believes is current.
    pub scene_key: String,
    /// Position of the choice within that scene.
    pub choice_index: usize,
}

impl Command for ApplyChoice {
    fn command_type(&self) -> &'static str {
        "story.apply_choice"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn user_id(&self) -> Uuid {
        self.user_id
    }
}

/// Command to restart the story from the beginning.
#[derive(Debug, Clone)]
pub struct RestartStory {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The player.
    pub user_id: Uuid,
}

impl Command for RestartStory {
    fn command_type(&self) -> &'static str {
        "story.restart"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn user_id(&self) -> Uuid {
        self.user_id
    }
}

/// Command to retry saving progress that failed to persist.
#[derive(Debug, Clone)]
pub struct SaveProgress {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The player.
    pub user_id: Uuid,
}

impl Command for SaveProgress {
    fn command_type(&self) -> &'static str {
        "story.save_progress"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn user_id(&self) -> Uuid {
        self.user_id
    }
}

//! Explicit collaborator context passed into game sessions.

use std::fmt;
use std::sync::Arc;

use storyweave_core::clock::Clock;
use storyweave_core::ports::{AchievementService, ProfileStore, ScoreLedger, StoryRepository};

use crate::domain::engine::MilestoneRules;

/// Everything a game session talks to.
#[derive(Clone)]
pub struct GameContext {
    /// Source of the story graph.
    pub stories: Arc<dyn StoryRepository>,
    /// Saved progress and profiles.
    pub profiles: Arc<dyn ProfileStore>,
    /// Achievement grants.
    pub achievements: Arc<dyn AchievementService>,
    /// High-score ledger.
    pub scores: Arc<dyn ScoreLedger>,
    /// Time source for event metadata.
    pub clock: Arc<dyn Clock>,
    /// Rule-based achievements applied by every engine.
    pub milestones: MilestoneRules,
}

impl GameContext {
    /// Creates a context with the default milestone rules.
    #[must_use]
    pub fn new(
        stories: Arc<dyn StoryRepository>,
        profiles: Arc<dyn ProfileStore>,
        achievements: Arc<dyn AchievementService>,
        scores: Arc<dyn ScoreLedger>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            stories,
            profiles,
            achievements,
            scores,
            clock,
            milestones: MilestoneRules::default(),
        }
    }

    /// Replaces the milestone rules.
    #[must_use]
    pub fn with_milestones(mut self, milestones: MilestoneRules) -> Self {
        self.milestones = milestones;
        self
    }
}

impl fmt::Debug for GameContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameContext")
            .field("milestones", &self.milestones)
            .finish_non_exhaustive()
    }
}

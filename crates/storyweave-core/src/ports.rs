//! Collaborator ports consumed by the story engine.
//!
//! Every external capability the engine needs (story content, saved progress,
//! achievements, the score ledger) sits behind one of these traits. Reads
//! return typed records; implementations narrow raw storage rows into these
//! shapes at their own boundary.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Stored representation of one outgoing choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceRecord {
    /// Display text.
    pub text: String,
    /// Key of the scene this choice leads to.
    pub target_scene_key: String,
    /// Inventory item that must be held to pick this choice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_item: Option<String>,
    /// Minimum score needed to pick this choice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_score: Option<i64>,
}

/// Stored representation of a scene, with its choices in declared order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneRecord {
    /// Unique scene key.
    pub key: String,
    /// Display text.
    pub text: String,
    /// Score awarded on arrival.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_delta: Option<i64>,
    /// Inventory item granted on arrival.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grants_item: Option<String>,
    /// Achievement granted on arrival.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grants_achievement: Option<String>,
    /// Outgoing choices.
    #[serde(default)]
    pub choices: Vec<ChoiceRecord>,
}

/// A player's persisted progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedProgress {
    /// Current scene key.
    pub scene_key: String,
    /// Cumulative score.
    pub score: i64,
    /// Held inventory item keys.
    pub inventory: Vec<String>,
}

/// Public profile details for a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    /// The player.
    pub user_id: Uuid,
    /// Chosen display name, if any.
    pub username: Option<String>,
    /// Avatar image URL, if any.
    pub avatar_url: Option<String>,
}

/// One row of the score ledger joined with its owner's profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreEntry {
    /// The player.
    pub user_id: Uuid,
    /// Best recorded score.
    pub score: i64,
    /// Scene the best score was achieved at.
    pub ending_scene_key: Option<String>,
    /// Text of that scene, when it still exists.
    pub ending_scene_text: Option<String>,
    /// The owner's profile. `None` when the profile row is missing.
    pub profile: Option<PlayerProfile>,
}

/// A player's position on the leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRank {
    /// 1-based rank.
    pub rank: i64,
    /// Best recorded score.
    pub score: i64,
}

/// Catalog entry describing an achievement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementDefinition {
    /// Unique achievement key, e.g. `GAME_START`.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Longer description.
    pub description: String,
    /// Icon name.
    pub icon: Option<String>,
}

/// An achievement a player has unlocked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnlockedAchievement {
    /// The achievement key.
    pub key: String,
    /// When it was unlocked.
    pub achieved_at: DateTime<Utc>,
}

/// Read-only source of the full story graph.
#[async_trait]
pub trait StoryRepository: Send + Sync {
    /// Fetch every scene with its choices.
    async fn fetch(&self) -> Result<Vec<SceneRecord>, DomainError>;
}

/// Per-player progress and profile storage.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Load saved progress. `None` means the player has never played.
    async fn load(&self, user_id: Uuid) -> Result<Option<SavedProgress>, DomainError>;

    /// Durably save progress. Last write wins.
    async fn save(&self, user_id: Uuid, progress: &SavedProgress) -> Result<(), DomainError>;

    /// Load the public profile details for a player.
    async fn profile(&self, user_id: Uuid) -> Result<Option<PlayerProfile>, DomainError>;
}

/// Grants and lists achievements. Grants must be idempotent.
#[async_trait]
pub trait AchievementService: Send + Sync {
    /// Record that a player unlocked an achievement.
    async fn grant(&self, user_id: Uuid, achievement_key: &str) -> Result<(), DomainError>;

    /// List the achievements a player has unlocked.
    async fn unlocked(&self, user_id: Uuid) -> Result<Vec<UnlockedAchievement>, DomainError>;

    /// List every known achievement definition.
    async fn catalog(&self) -> Result<Vec<AchievementDefinition>, DomainError>;
}

/// Best-score ledger backing the leaderboard.
#[async_trait]
pub trait ScoreLedger: Send + Sync {
    /// Store `score` for the player only if it beats their current best.
    /// Returns `true` when a new high score was recorded.
    async fn submit_if_higher(
        &self,
        user_id: Uuid,
        score: i64,
        ending_scene_key: &str,
    ) -> Result<bool, DomainError>;

    /// The player's best recorded score.
    async fn best_score(&self, user_id: Uuid) -> Result<Option<i64>, DomainError>;

    /// Highest scores, best first.
    async fn top_scores(&self, limit: u32) -> Result<Vec<ScoreEntry>, DomainError>;

    /// The player's rank, if they have a score: one more than the number of
    /// players with a profile and a strictly higher score. Players without
    /// a profile are not shown on the leaderboard, so they never push
    /// anyone down.
    async fn rank_of(&self, user_id: Uuid) -> Result<Option<UserRank>, DomainError>;
}

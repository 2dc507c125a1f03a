//! Achievement catalog joins.

use serde::Serialize;
use storyweave_core::ports::{AchievementDefinition, UnlockedAchievement};

use chrono::{DateTime, Utc};

/// Icon shown for achievements whose definition has none.
pub const DEFAULT_ACHIEVEMENT_ICON: &str = "Trophy";

/// An achievement definition as presented to players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AchievementView {
    /// Stable key.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Icon name, never empty.
    pub icon: String,
}

impl From<AchievementDefinition> for AchievementView {
    fn from(definition: AchievementDefinition) -> Self {
        Self {
            key: definition.key,
            name: definition.name,
            description: definition.description,
            icon: definition
                .icon
                .unwrap_or_else(|| DEFAULT_ACHIEVEMENT_ICON.to_owned()),
        }
    }
}

/// An achievement a player holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnlockedAchievementView {
    /// The achievement.
    #[serde(flatten)]
    pub achievement: AchievementView,
    /// When it was unlocked.
    pub achieved_at: DateTime<Utc>,
}

/// Joins a player's unlocks with the catalog, newest first. Unlocks whose key
/// is not in the catalog are skipped.
#[must_use]
pub fn unlocked_with_definitions(
    mut unlocked: Vec<UnlockedAchievement>,
    catalog: &[AchievementDefinition],
) -> Vec<UnlockedAchievementView> {
    unlocked.sort_by(|a, b| b.achieved_at.cmp(&a.achieved_at));
    unlocked
        .into_iter()
        .filter_map(|u| {
            catalog
                .iter()
                .find(|d| d.key == u.key)
                .map(|d| UnlockedAchievementView {
                    achievement: AchievementView::from(d.clone()),
                    achieved_at: u.achieved_at,
                })
        })
        .collect()
}

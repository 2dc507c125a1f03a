//! Query handlers for progress and recognition.
//!
//! Each handler reads from the collaborator ports and returns a read-only
//! view DTO.

use serde::Serialize;
use storyweave_core::error::DomainError;
use storyweave_core::ports::{AchievementService, ProfileStore, ScoreLedger};
use tracing::debug;
use uuid::Uuid;

use crate::domain::achievements::{AchievementView, UnlockedAchievementView, unlocked_with_definitions};
use crate::domain::leaderboard::{self, Leaderboard};

/// Public view of a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerProfileView {
    /// The player.
    pub user_id: Uuid,
    /// Username, if set.
    pub username: Option<String>,
    /// Avatar URL, if set.
    pub avatar_url: Option<String>,
    /// Best recorded score.
    pub best_score: Option<i64>,
    /// Unlocked achievements, newest first.
    pub achievements: Vec<UnlockedAchievementView>,
}

/// Returns the top `limit` scores, plus the viewer's own rank when they are
/// ranked below the shown rows.
///
/// # Errors
///
/// Returns `DomainError::Validation` for an out-of-range limit, or the
/// ledger's error if a read fails.
pub async fn get_leaderboard(
    viewer: Option<Uuid>,
    limit: Option<u32>,
    scores: &dyn ScoreLedger,
    profiles: &dyn ProfileStore,
) -> Result<Leaderboard, DomainError> {
    let limit = leaderboard::resolve_limit(limit)?;
    let top = scores.top_scores(limit).await?;

    // A viewer listed in `top` without a profile is dropped from the rows,
    // so they still need their own rank row.
    let listed = |user_id: Uuid| top.iter().any(|e| e.user_id == user_id && e.profile.is_some());
    let (own_rank, own_profile) = match viewer {
        Some(user_id) if !listed(user_id) => {
            let rank = scores.rank_of(user_id).await?;
            let profile = match rank {
                Some(_) => profiles.profile(user_id).await?,
                None => None,
            };
            (rank, profile)
        }
        _ => (None, None),
    };

    let board = leaderboard::build(top, viewer, own_rank, own_profile.as_ref());
    debug!(
        rows = board.entries.len(),
        has_user_rank = board.user_rank.is_some(),
        "leaderboard assembled"
    );
    Ok(board)
}

/// Returns a player's public profile.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the player has no profile, or a
/// collaborator's error if a read fails.
pub async fn get_player_profile(
    user_id: Uuid,
    profiles: &dyn ProfileStore,
    scores: &dyn ScoreLedger,
    achievements: &dyn AchievementService,
) -> Result<PlayerProfileView, DomainError> {
    let profile = profiles
        .profile(user_id)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("no profile for player {user_id}")))?;
    let best_score = scores.best_score(user_id).await?;
    let unlocked = achievements.unlocked(user_id).await?;
    let catalog = achievements.catalog().await?;

    Ok(PlayerProfileView {
        user_id,
        username: profile.username,
        avatar_url: profile.avatar_url,
        best_score,
        achievements: unlocked_with_definitions(unlocked, &catalog),
    })
}

/// Returns every achievement definition.
///
/// # Errors
///
/// Returns the achievement service's error if the catalog cannot be read.
pub async fn get_achievement_catalog(
    achievements: &dyn AchievementService,
) -> Result<Vec<AchievementView>, DomainError> {
    Ok(achievements
        .catalog()
        .await?
        .into_iter()
        .map(AchievementView::from)
        .collect())
}

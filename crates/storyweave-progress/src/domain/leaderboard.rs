//! Leaderboard assembly.

use serde::Serialize;
use storyweave_core::error::DomainError;
use storyweave_core::ports::{PlayerProfile, ScoreEntry, UserRank};
use uuid::Uuid;

/// Number of rows shown when no limit is requested.
pub const DEFAULT_LEADERBOARD_LIMIT: u32 = 10;

/// Largest accepted limit.
pub const MAX_LEADERBOARD_LIMIT: u32 = 100;

/// Display name for players without a username.
pub const ANONYMOUS_DISPLAY_NAME: &str = "Anonymous";

/// Resolves a requested row limit.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the limit is zero or above
/// [`MAX_LEADERBOARD_LIMIT`].
pub fn resolve_limit(requested: Option<u32>) -> Result<u32, DomainError> {
    match requested {
        None => Ok(DEFAULT_LEADERBOARD_LIMIT),
        Some(limit) if (1..=MAX_LEADERBOARD_LIMIT).contains(&limit) => Ok(limit),
        Some(limit) => Err(DomainError::Validation(format!(
            "limit must be between 1 and {MAX_LEADERBOARD_LIMIT}, got {limit}"
        ))),
    }
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardRow {
    /// 1-based rank.
    pub rank: i64,
    /// The player.
    pub user_id: Uuid,
    /// Username, or `"Anonymous"`.
    pub display_name: String,
    /// Avatar URL, if set.
    pub avatar_url: Option<String>,
    /// Best score.
    pub score: i64,
    /// Text of the scene the best run ended on.
    pub ending_scene_text: Option<String>,
    /// Whether this row belongs to the viewing player.
    pub is_current_user: bool,
}

/// The leaderboard as shown to one viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Leaderboard {
    /// Top rows, best first.
    pub entries: Vec<LeaderboardRow>,
    /// The viewer's own row, when they are ranked but not in `entries`.
    pub user_rank: Option<LeaderboardRow>,
}

fn display_name(profile: Option<&PlayerProfile>) -> String {
    profile
        .and_then(|p| p.username.clone())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| ANONYMOUS_DISPLAY_NAME.to_owned())
}

/// Builds the leaderboard from the ledger's top entries.
///
/// `top` must be ordered best first. Entries without a profile are dropped
/// and the rest get competition ranks: tied scores share a rank and the
/// next distinct score skips past them, matching
/// [`ScoreLedger::rank_of`](storyweave_core::ports::ScoreLedger::rank_of).
/// `own_rank` is shown separately only when the viewer is not already
/// among the rows.
#[must_use]
pub fn build(
    top: Vec<ScoreEntry>,
    viewer: Option<Uuid>,
    own_rank: Option<UserRank>,
    own_profile: Option<&PlayerProfile>,
) -> Leaderboard {
    let mut entries: Vec<LeaderboardRow> = Vec::with_capacity(top.len());
    for (position, entry) in (1_i64..).zip(top.into_iter().filter(|e| e.profile.is_some())) {
        let rank = match entries.last() {
            Some(previous) if previous.score == entry.score => previous.rank,
            _ => position,
        };
        entries.push(LeaderboardRow {
            rank,
            user_id: entry.user_id,
            display_name: display_name(entry.profile.as_ref()),
            avatar_url: entry.profile.as_ref().and_then(|p| p.avatar_url.clone()),
            score: entry.score,
            ending_scene_text: entry.ending_scene_text,
            is_current_user: viewer == Some(entry.user_id),
        });
    }

    let user_rank = match (viewer, own_rank) {
        (Some(user_id), Some(rank)) if !entries.iter().any(|row| row.user_id == user_id) => {
            Some(LeaderboardRow {
                rank: rank.rank,
                user_id,
                display_name: display_name(own_profile),
                avatar_url: own_profile.and_then(|p| p.avatar_url.clone()),
                score: rank.score,
                ending_scene_text: None,
                is_current_user: true,
            })
        }
        _ => None,
    };

    Leaderboard { entries, user_rank }
}

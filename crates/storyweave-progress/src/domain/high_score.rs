//! High-score evaluation.

use serde::Serialize;

/// Result of comparing a final score against a player's stored best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HighScoreOutcome {
    /// The score is strictly higher than the stored best, or there is none.
    NewHighScore,
    /// The stored best is equal or higher.
    NotBeaten,
}

impl HighScoreOutcome {
    /// Returns `true` for `NewHighScore`.
    #[must_use]
    pub fn is_new_high_score(self) -> bool {
        matches!(self, Self::NewHighScore)
    }
}

/// Compares `final_score` to `previous_best`. Ties do not count as a new
/// high score.
#[must_use]
pub fn evaluate(previous_best: Option<i64>, final_score: i64) -> HighScoreOutcome {
    match previous_best {
        Some(best) if best >= final_score => HighScoreOutcome::NotBeaten,
        _ => HighScoreOutcome::NewHighScore,
    }
}

//! Domain layer: pure leaderboard, high-score, and achievement logic.

pub mod achievements;
pub mod high_score;
pub mod leaderboard;

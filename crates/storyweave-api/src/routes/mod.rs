//! Route modules.

pub mod achievements;
pub mod game;
pub mod health;
pub mod leaderboard;
pub mod profiles;

//! Storyweave — progress and recognition.
//!
//! Responsible for high-score evaluation, the leaderboard, the achievement
//! catalog, and public player profile views.

pub mod application;
pub mod domain;

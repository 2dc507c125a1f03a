//! Storyweave Store — adapters for the collaborator ports.
//!
//! PostgreSQL implementations of every port (via `sqlx`) and a YAML-backed
//! story repository for seeding and local play. Raw rows are narrowed into
//! the typed records of `storyweave_core::ports` here and nowhere else.

pub mod pg_achievement_service;
pub mod pg_profile_store;
pub mod pg_score_ledger;
pub mod pg_story_repository;
pub mod schema;
pub mod yaml_story_repository;

use storyweave_core::error::DomainError;

fn db_error(context: &str, error: &sqlx::Error) -> DomainError {
    DomainError::Infrastructure(format!("{context}: {error}"))
}

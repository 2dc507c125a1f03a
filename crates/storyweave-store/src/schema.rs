//! Database schema.
//!
//! The schema lives in the workspace `migrations/` directory and is embedded
//! at compile time.

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use storyweave_core::error::DomainError;
use tracing::info;

/// Embedded migrations for the story, profile, achievement, and score tables.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Applies any pending migrations.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if a migration fails.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DomainError> {
    MIGRATOR
        .run(pool)
        .await
        .map_err(|e| DomainError::Infrastructure(format!("migration failed: {e}")))?;
    info!("database migrations applied");
    Ok(())
}

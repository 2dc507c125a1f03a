//! `PostgreSQL` implementation of the `AchievementService` trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::debug;
use uuid::Uuid;

use storyweave_core::error::DomainError;
use storyweave_core::ports::{AchievementDefinition, AchievementService, UnlockedAchievement};

use crate::db_error;

#[derive(Debug, FromRow)]
struct UnlockedRow {
    achievement_key: String,
    achieved_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct DefinitionRow {
    key: String,
    name: String,
    description: String,
    icon: Option<String>,
}

/// PostgreSQL-backed achievement service.
#[derive(Debug, Clone)]
pub struct PgAchievementService {
    pool: PgPool,
}

impl PgAchievementService {
    /// Creates a new `PgAchievementService`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AchievementService for PgAchievementService {
    async fn grant(&self, user_id: Uuid, achievement_key: &str) -> Result<(), DomainError> {
        let result = sqlx::query(
            "INSERT INTO user_achievements (user_id, achievement_key) VALUES ($1, $2) \
             ON CONFLICT (user_id, achievement_key) DO NOTHING",
        )
        .bind(user_id)
        .bind(achievement_key)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("failed to grant achievement", &e))?;

        if result.rows_affected() == 0 {
            debug!(%user_id, achievement_key, "achievement already held");
        }
        Ok(())
    }

    async fn unlocked(&self, user_id: Uuid) -> Result<Vec<UnlockedAchievement>, DomainError> {
        let rows: Vec<UnlockedRow> = sqlx::query_as(
            "SELECT achievement_key, achieved_at FROM user_achievements \
             WHERE user_id = $1 ORDER BY achieved_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("failed to list achievements", &e))?;

        Ok(rows
            .into_iter()
            .map(|row| UnlockedAchievement {
                key: row.achievement_key,
                achieved_at: row.achieved_at,
            })
            .collect())
    }

    async fn catalog(&self) -> Result<Vec<AchievementDefinition>, DomainError> {
        let rows: Vec<DefinitionRow> =
            sqlx::query_as("SELECT key, name, description, icon FROM achievements ORDER BY key")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| db_error("failed to load achievement catalog", &e))?;

        Ok(rows
            .into_iter()
            .map(|row| AchievementDefinition {
                key: row.key,
                name: row.name,
                description: row.description,
                icon: row.icon,
            })
            .collect())
    }
}

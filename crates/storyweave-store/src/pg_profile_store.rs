//! `PostgreSQL` implementation of the `ProfileStore` trait.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use storyweave_core::error::DomainError;
use storyweave_core::ports::{PlayerProfile, ProfileStore, SavedProgress};

use crate::db_error;

#[derive(Debug, FromRow)]
struct ProgressRow {
    current_scene_key: Option<String>,
    score: i64,
    inventory: Vec<String>,
}

#[derive(Debug, FromRow)]
struct ProfileRow {
    id: Uuid,
    username: Option<String>,
    avatar_url: Option<String>,
}

/// PostgreSQL-backed profile store. Progress lives on the player's profile
/// row; a row without a current scene has no saved progress.
#[derive(Debug, Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    /// Creates a new `PgProfileStore`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn load(&self, user_id: Uuid) -> Result<Option<SavedProgress>, DomainError> {
        let row: Option<ProgressRow> = sqlx::query_as(
            "SELECT current_scene_key, score, inventory FROM profiles WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("failed to load progress", &e))?;

        Ok(row.and_then(|row| {
            row.current_scene_key.map(|scene_key| SavedProgress {
                scene_key,
                score: row.score,
                inventory: row.inventory,
            })
        }))
    }

    async fn save(&self, user_id: Uuid, progress: &SavedProgress) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO profiles (id, current_scene_key, score, inventory, updated_at) \
             VALUES ($1, $2, $3, $4, NOW()) \
             ON CONFLICT (id) DO UPDATE SET \
                 current_scene_key = EXCLUDED.current_scene_key, \
                 score = EXCLUDED.score, \
                 inventory = EXCLUDED.inventory, \
                 updated_at = EXCLUDED.updated_at",
        )
        .bind(user_id)
        .bind(&progress.scene_key)
        .bind(progress.score)
        .bind(&progress.inventory)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("failed to save progress", &e))?;
        Ok(())
    }

    async fn profile(&self, user_id: Uuid) -> Result<Option<PlayerProfile>, DomainError> {
        let row: Option<ProfileRow> =
            sqlx::query_as("SELECT id, username, avatar_url FROM profiles WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("failed to load profile", &e))?;

        Ok(row.map(|row| PlayerProfile {
            user_id: row.id,
            username: row.username,
            avatar_url: row.avatar_url,
        }))
    }
}

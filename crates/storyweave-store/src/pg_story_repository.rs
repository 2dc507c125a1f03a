//! `PostgreSQL` implementation of the `StoryRepository` trait.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::{debug, info};

use storyweave_core::error::DomainError;
use storyweave_core::ports::{ChoiceRecord, SceneRecord, StoryRepository};

use crate::db_error;

#[derive(Debug, FromRow)]
struct SceneRow {
    key: String,
    text: String,
    score_delta: Option<i64>,
    grants_item: Option<String>,
    grants_achievement: Option<String>,
}

#[derive(Debug, FromRow)]
struct ChoiceRow {
    scene_key: String,
    text: String,
    target_scene_key: String,
    required_item: Option<String>,
    required_score: Option<i64>,
}

/// PostgreSQL-backed story repository.
#[derive(Debug, Clone)]
pub struct PgStoryRepository {
    pool: PgPool,
}

impl PgStoryRepository {
    /// Creates a new `PgStoryRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Replaces the stored story with `records` in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if any statement fails; the
    /// previous story is left in place.
    pub async fn replace_story(&self, records: &[SceneRecord]) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("failed to begin story transaction", &e))?;

        sqlx::query("DELETE FROM scenes")
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("failed to clear scenes", &e))?;

        for scene in records {
            sqlx::query(
                "INSERT INTO scenes (key, text, score_delta, grants_item, grants_achievement) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(&scene.key)
            .bind(&scene.text)
            .bind(scene.score_delta)
            .bind(&scene.grants_item)
            .bind(&scene.grants_achievement)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("failed to insert scene", &e))?;
        }

        for scene in records {
            for (position, choice) in (0_i32..).zip(&scene.choices) {
                sqlx::query(
                    "INSERT INTO choices \
                     (scene_key, position, text, target_scene_key, required_item, required_score) \
                     VALUES ($1, $2, $3, $4, $5, $6)",
                )
                .bind(&scene.key)
                .bind(position)
                .bind(&choice.text)
                .bind(&choice.target_scene_key)
                .bind(&choice.required_item)
                .bind(choice.required_score)
                .execute(&mut *tx)
                .await
                .map_err(|e| db_error("failed to insert choice", &e))?;
            }
        }

        tx.commit()
            .await
            .map_err(|e| db_error("failed to commit story", &e))?;
        info!(scenes = records.len(), "story replaced");
        Ok(())
    }
}

#[async_trait]
impl StoryRepository for PgStoryRepository {
    async fn fetch(&self) -> Result<Vec<SceneRecord>, DomainError> {
        // Both reads must see the same committed story.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("failed to begin story read", &e))?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("failed to set story read isolation", &e))?;

        let scenes: Vec<SceneRow> = sqlx::query_as(
            "SELECT key, text, score_delta, grants_item, grants_achievement \
             FROM scenes ORDER BY key",
        )
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| db_error("failed to load scenes", &e))?;

        let choices: Vec<ChoiceRow> = sqlx::query_as(
            "SELECT scene_key, text, target_scene_key, required_item, required_score \
             FROM choices ORDER BY scene_key, position",
        )
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| db_error("failed to load choices", &e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("failed to finish story read", &e))?;

        let mut by_scene: HashMap<String, Vec<ChoiceRecord>> = HashMap::new();
        for row in choices {
            by_scene.entry(row.scene_key).or_default().push(ChoiceRecord {
                text: row.text,
                target_scene_key: row.target_scene_key,
                required_item: row.required_item,
                required_score: row.required_score,
            });
        }

        let records: Vec<SceneRecord> = scenes
            .into_iter()
            .map(|row| SceneRecord {
                choices: by_scene.remove(&row.key).unwrap_or_default(),
                key: row.key,
                text: row.text,
                score_delta: row.score_delta,
                grants_item: row.grants_item,
                grants_achievement: row.grants_achievement,
            })
            .collect();
        debug!(scenes = records.len(), "story fetched");
        Ok(records)
    }
}

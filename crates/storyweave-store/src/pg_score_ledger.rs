//! `PostgreSQL` implementation of the `ScoreLedger` trait.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use storyweave_core::error::DomainError;
use storyweave_core::ports::{PlayerProfile, ScoreEntry, ScoreLedger, UserRank};
use storyweave_progress::domain::high_score::{self, HighScoreOutcome};

use crate::db_error;

#[derive(Debug, FromRow)]
struct ScoreRow {
    user_id: Uuid,
    score: i64,
    ending_scene_key: Option<String>,
    ending_scene_text: Option<String>,
    profile_id: Option<Uuid>,
    username: Option<String>,
    avatar_url: Option<String>,
}

impl From<ScoreRow> for ScoreEntry {
    fn from(row: ScoreRow) -> Self {
        Self {
            user_id: row.user_id,
            score: row.score,
            ending_scene_key: row.ending_scene_key,
            ending_scene_text: row.ending_scene_text,
            profile: row.profile_id.map(|user_id| PlayerProfile {
                user_id,
                username: row.username,
                avatar_url: row.avatar_url,
            }),
        }
    }
}

#[derive(Debug, FromRow)]
struct RankRow {
    rank: i64,
    score: i64,
}

/// PostgreSQL-backed score ledger holding one best score per player.
///
/// Ranks use `RANK()`, so tied players share a rank.
#[derive(Debug, Clone)]
pub struct PgScoreLedger {
    pool: PgPool,
}

impl PgScoreLedger {
    /// Creates a new `PgScoreLedger`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScoreLedger for PgScoreLedger {
    async fn submit_if_higher(
        &self,
        user_id: Uuid,
        score: i64,
        ending_scene_key: &str,
    ) -> Result<bool, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("failed to begin score transaction", &e))?;

        let previous: Option<i64> =
            sqlx::query_scalar("SELECT score FROM game_scores WHERE user_id = $1 FOR UPDATE")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| db_error("failed to read best score", &e))?;

        if high_score::evaluate(previous, score) == HighScoreOutcome::NotBeaten {
            return Ok(false);
        }

        // The WHERE clause covers a concurrent first insert for the same player.
        let stored = sqlx::query(
            "INSERT INTO game_scores (user_id, score, ending_scene_key, updated_at) \
             VALUES ($1, $2, $3, NOW()) \
             ON CONFLICT (user_id) DO UPDATE SET \
                 score = EXCLUDED.score, \
                 ending_scene_key = EXCLUDED.ending_scene_key, \
                 updated_at = EXCLUDED.updated_at \
             WHERE game_scores.score < EXCLUDED.score",
        )
        .bind(user_id)
        .bind(score)
        .bind(ending_scene_key)
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("failed to store score", &e))?
        .rows_affected()
            > 0;

        tx.commit()
            .await
            .map_err(|e| db_error("failed to commit score", &e))?;
        if stored {
            info!(%user_id, score, previous_best = ?previous, "new high score");
        }
        Ok(stored)
    }

    async fn best_score(&self, user_id: Uuid) -> Result<Option<i64>, DomainError> {
        sqlx::query_scalar("SELECT score FROM game_scores WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("failed to read best score", &e))
    }

    async fn top_scores(&self, limit: u32) -> Result<Vec<ScoreEntry>, DomainError> {
        let rows: Vec<ScoreRow> = sqlx::query_as(
            "SELECT gs.user_id, gs.score, gs.ending_scene_key, \
                    s.text AS ending_scene_text, \
                    p.id AS profile_id, p.username, p.avatar_url \
             FROM game_scores gs \
             LEFT JOIN profiles p ON p.id = gs.user_id \
             LEFT JOIN scenes s ON s.key = gs.ending_scene_key \
             ORDER BY gs.score DESC, gs.updated_at ASC \
             LIMIT $1",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("failed to load top scores", &e))?;

        Ok(rows.into_iter().map(ScoreEntry::from).collect())
    }

    async fn rank_of(&self, user_id: Uuid) -> Result<Option<UserRank>, DomainError> {
        let row: Option<RankRow> = sqlx::query_as(
            "SELECT gs.score, \
                    1 + ( \
                        SELECT COUNT(*) FROM game_scores higher \
                        JOIN profiles p ON p.id = higher.user_id \
                        WHERE higher.score > gs.score \
                    ) AS rank \
             FROM game_scores gs WHERE gs.user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("failed to compute rank", &e))?;

        Ok(row.map(|row| UserRank {
            rank: row.rank,
            score: row.score,
        }))
    }
}

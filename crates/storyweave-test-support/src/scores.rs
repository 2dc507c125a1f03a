//! Fake `ScoreLedger` implementations.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use storyweave_core::error::DomainError;
use storyweave_core::ports::{PlayerProfile, ScoreEntry, ScoreLedger, UserRank};
use uuid::Uuid;

/// A score ledger backed by an in-memory map of best scores.
///
/// Ranks follow competition ranking: a player's rank is one more than the
/// number of players with a profile and a strictly higher score.
#[derive(Debug, Default)]
pub struct InMemoryScoreLedger {
    entries: Mutex<HashMap<Uuid, ScoreEntry>>,
    profiles: HashMap<Uuid, PlayerProfile>,
    scene_texts: HashMap<String, String>,
}

impl InMemoryScoreLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a best score.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn with_score(self, user_id: Uuid, score: i64, ending_scene_key: &str) -> Self {
        self.entries.lock().unwrap().insert(
            user_id,
            ScoreEntry {
                user_id,
                score,
                ending_scene_key: Some(ending_scene_key.to_owned()),
                ending_scene_text: None,
                profile: None,
            },
        );
        self
    }

    /// Registers a profile joined onto that player's entries.
    #[must_use]
    pub fn with_profile(mut self, profile: PlayerProfile) -> Self {
        self.profiles.insert(profile.user_id, profile);
        self
    }

    /// Registers the text joined onto entries ending at `scene_key`.
    #[must_use]
    pub fn with_scene_text(mut self, scene_key: &str, text: &str) -> Self {
        self.scene_texts.insert(scene_key.to_owned(), text.to_owned());
        self
    }

    /// The best score recorded for a player.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn best(&self, user_id: Uuid) -> Option<i64> {
        self.entries.lock().unwrap().get(&user_id).map(|e| e.score)
    }

    fn joined(&self, entry: &ScoreEntry) -> ScoreEntry {
        ScoreEntry {
            ending_scene_text: entry
                .ending_scene_key
                .as_ref()
                .and_then(|key| self.scene_texts.get(key).cloned()),
            profile: self.profiles.get(&entry.user_id).cloned(),
            ..entry.clone()
        }
    }
}

#[async_trait]
impl ScoreLedger for InMemoryScoreLedger {
    async fn submit_if_higher(
        &self,
        user_id: Uuid,
        score: i64,
        ending_scene_key: &str,
    ) -> Result<bool, DomainError> {
        let mut entries = self.entries.lock().unwrap();
        if entries.get(&user_id).is_some_and(|e| e.score >= score) {
            return Ok(false);
        }
        entries.insert(
            user_id,
            ScoreEntry {
                user_id,
                score,
                ending_scene_key: Some(ending_scene_key.to_owned()),
                ending_scene_text: None,
                profile: None,
            },
        );
        Ok(true)
    }

    async fn best_score(&self, user_id: Uuid) -> Result<Option<i64>, DomainError> {
        Ok(self.best(user_id))
    }

    async fn top_scores(&self, limit: u32) -> Result<Vec<ScoreEntry>, DomainError> {
        let mut entries: Vec<ScoreEntry> = self
            .entries
            .lock()
            .unwrap()
            .values()
            .map(|e| self.joined(e))
            .collect();
        entries.sort_by(|a, b| b.score.cmp(&a.score).then(a.user_id.cmp(&b.user_id)));
        entries.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(entries)
    }

    async fn rank_of(&self, user_id: Uuid) -> Result<Option<UserRank>, DomainError> {
        let entries = self.entries.lock().unwrap();
        let Some(own) = entries.get(&user_id) else {
            return Ok(None);
        };
        let higher = entries
            .values()
            .filter(|e| e.score > own.score && self.profiles.contains_key(&e.user_id))
            .count();
        Ok(Some(UserRank {
            rank: i64::try_from(higher).unwrap_or(i64::MAX - 1) + 1,
            score: own.score,
        }))
    }
}

/// A score ledger whose every call fails.
#[derive(Debug)]
pub struct FailingScoreLedger;

#[async_trait]
impl ScoreLedger for FailingScoreLedger {
    async fn submit_if_higher(
        &self,
        _user_id: Uuid,
        _score: i64,
        _ending_scene_key: &str,
    ) -> Result<bool, DomainError> {
        Err(DomainError::Infrastructure("score submission failed".to_owned()))
    }

    async fn best_score(&self, _user_id: Uuid) -> Result<Option<i64>, DomainError> {
        Err(DomainError::Infrastructure("score lookup failed".to_owned()))
    }

    async fn top_scores(&self, _limit: u32) -> Result<Vec<ScoreEntry>, DomainError> {
        Err(DomainError::Infrastructure("leaderboard query failed".to_owned()))
    }

    async fn rank_of(&self, _user_id: Uuid) -> Result<Option<UserRank>, DomainError> {
        Err(DomainError::Infrastructure("rank query failed".to_owned()))
    }
}

//! Fake `AchievementService` implementations.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use storyweave_core::error::DomainError;
use storyweave_core::ports::{AchievementDefinition, AchievementService, UnlockedAchievement};
use uuid::Uuid;

/// An achievement service that records grants.
///
/// Granting an achievement the player already holds is accepted and not
/// recorded again. New grants are stamped with `granted_at`.
#[derive(Debug)]
pub struct RecordingAchievementService {
    catalog: Vec<AchievementDefinition>,
    unlocked: Mutex<Vec<(Uuid, UnlockedAchievement)>>,
    granted: Mutex<Vec<(Uuid, String)>>,
    granted_at: DateTime<Utc>,
}

impl Default for RecordingAchievementService {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingAchievementService {
    /// Creates a service with an empty catalog and no unlocks.
    #[must_use]
    pub fn new() -> Self {
        Self {
            catalog: Vec::new(),
            unlocked: Mutex::new(Vec::new()),
            granted: Mutex::new(Vec::new()),
            granted_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    /// Sets the achievement catalog.
    #[must_use]
    pub fn with_catalog(mut self, catalog: Vec<AchievementDefinition>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Seeds an achievement the player already holds.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn with_unlocked(self, user_id: Uuid, key: &str, achieved_at: DateTime<Utc>) -> Self {
        self.unlocked.lock().unwrap().push((
            user_id,
            UnlockedAchievement {
                key: key.to_owned(),
                achieved_at,
            },
        ));
        self
    }

    /// Sets the timestamp recorded for new grants.
    #[must_use]
    pub fn granting_at(mut self, granted_at: DateTime<Utc>) -> Self {
        self.granted_at = granted_at;
        self
    }

    /// Grants accepted through the port, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn granted(&self) -> Vec<(Uuid, String)> {
        self.granted.lock().unwrap().clone()
    }
}

#[async_trait]
impl AchievementService for RecordingAchievementService {
    async fn grant(&self, user_id: Uuid, achievement_key: &str) -> Result<(), DomainError> {
        let mut unlocked = self.unlocked.lock().unwrap();
        if unlocked
            .iter()
            .any(|(user, a)| *user == user_id && a.key == achievement_key)
        {
            return Ok(());
        }
        unlocked.push((
            user_id,
            UnlockedAchievement {
                key: achievement_key.to_owned(),
                achieved_at: self.granted_at,
            },
        ));
        self.granted
            .lock()
            .unwrap()
            .push((user_id, achievement_key.to_owned()));
        Ok(())
    }

    async fn unlocked(&self, user_id: Uuid) -> Result<Vec<UnlockedAchievement>, DomainError> {
        Ok(self
            .unlocked
            .lock()
            .unwrap()
            .iter()
            .filter(|(user, _)| *user == user_id)
            .map(|(_, a)| a.clone())
            .collect())
    }

    async fn catalog(&self) -> Result<Vec<AchievementDefinition>, DomainError> {
        Ok(self.catalog.clone())
    }
}

/// An achievement service whose every call fails.
#[derive(Debug)]
pub struct FailingAchievementService;

#[async_trait]
impl AchievementService for FailingAchievementService {
    async fn grant(&self, _user_id: Uuid, _achievement_key: &str) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("achievement grant failed".to_owned()))
    }

    async fn unlocked(&self, _user_id: Uuid) -> Result<Vec<UnlockedAchievement>, DomainError> {
        Err(DomainError::Infrastructure("achievement listing failed".to_owned()))
    }

    async fn catalog(&self) -> Result<Vec<AchievementDefinition>, DomainError> {
        Err(DomainError::Infrastructure("achievement catalog failed".to_owned()))
    }
}

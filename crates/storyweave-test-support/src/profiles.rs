//! Fake `ProfileStore` implementations.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use storyweave_core::error::DomainError;
use storyweave_core::ports::{PlayerProfile, ProfileStore, SavedProgress};
use uuid::Uuid;

/// A profile store backed by in-memory maps.
///
/// Saves overwrite the stored progress and are counted. When configured
/// with [`failing_saves`](Self::failing_saves), saves return an
/// infrastructure error while loads keep working.
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    progress: Mutex<HashMap<Uuid, SavedProgress>>,
    profiles: HashMap<Uuid, PlayerProfile>,
    saves: Mutex<usize>,
    fail_saves: AtomicBool,
}

impl InMemoryProfileStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds saved progress for a player.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn with_progress(self, user_id: Uuid, progress: SavedProgress) -> Self {
        self.progress.lock().unwrap().insert(user_id, progress);
        self
    }

    /// Seeds a player profile.
    #[must_use]
    pub fn with_profile(mut self, profile: PlayerProfile) -> Self {
        self.profiles.insert(profile.user_id, profile);
        self
    }

    /// Makes every save fail until [`set_failing_saves`](Self::set_failing_saves)
    /// turns it off.
    #[must_use]
    pub fn failing_saves(self) -> Self {
        self.set_failing_saves(true);
        self
    }

    /// Toggles save failures.
    pub fn set_failing_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// The progress currently stored for a player.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn saved(&self, user_id: Uuid) -> Option<SavedProgress> {
        self.progress.lock().unwrap().get(&user_id).cloned()
    }

    /// Number of successful saves.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn load(&self, user_id: Uuid) -> Result<Option<SavedProgress>, DomainError> {
        Ok(self.saved(user_id))
    }

    async fn save(&self, user_id: Uuid, progress: &SavedProgress) -> Result<(), DomainError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(DomainError::Infrastructure("profile save failed".to_owned()));
        }
        self.progress
            .lock()
            .unwrap()
            .insert(user_id, progress.clone());
        *self.saves.lock().unwrap() += 1;
        Ok(())
    }

    async fn profile(&self, user_id: Uuid) -> Result<Option<PlayerProfile>, DomainError> {
        Ok(self.profiles.get(&user_id).cloned())
    }
}

/// A profile store whose every call fails.
#[derive(Debug)]
pub struct FailingProfileStore;

#[async_trait]
impl ProfileStore for FailingProfileStore {
    async fn load(&self, _user_id: Uuid) -> Result<Option<SavedProgress>, DomainError> {
        Err(DomainError::Infrastructure("profile load failed".to_owned()))
    }

    async fn save(&self, _user_id: Uuid, _progress: &SavedProgress) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("profile save failed".to_owned()))
    }

    async fn profile(&self, _user_id: Uuid) -> Result<Option<PlayerProfile>, DomainError> {
        Err(DomainError::Infrastructure("profile lookup failed".to_owned()))
    }
}

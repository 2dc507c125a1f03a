//! Live game sessions, one per player.
//!
//! A session outlives the request that loaded it, so state that failed to
//! save stays authoritative until a later save succeeds.

use std::collections::HashMap;
use std::sync::Arc;

use storyweave_core::error::DomainError;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;
use uuid::Uuid;

use crate::application::context::GameContext;
use crate::application::session::GameSession;

/// Shared registry of live sessions keyed by player.
#[derive(Debug, Clone)]
pub struct SessionRegistry {
    context: GameContext,
    sessions: Arc<Mutex<HashMap<Uuid, Arc<Mutex<GameSession>>>>>,
}

impl SessionRegistry {
    /// Creates an empty registry whose sessions use `context`.
    #[must_use]
    pub fn new(context: GameContext) -> Self {
        Self {
            context,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// The collaborators shared by every session.
    #[must_use]
    pub fn context(&self) -> &GameContext {
        &self.context
    }

    /// Locks the player's live session, loading it first if needed.
    ///
    /// Requests for the same player are serialized by the returned guard.
    /// A failed load leaves the session unloaded so the next call retries.
    ///
    /// # Errors
    ///
    /// Returns the load error if the story or progress cannot be fetched, or
    /// `DomainError::Structural` if the story is malformed.
    pub async fn checkout(&self, user_id: Uuid) -> Result<OwnedMutexGuard<GameSession>, DomainError> {
        let session = {
            let mut sessions = self.sessions.lock().await;
            Arc::clone(sessions.entry(user_id).or_insert_with(|| {
                Arc::new(Mutex::new(GameSession::new(user_id, self.context.clone())))
            }))
        };

        let mut guard = session.lock_owned().await;
        if guard.engine().is_none() {
            debug!(%user_id, "loading live session");
            guard.load().await?;
        }
        Ok(guard)
    }

    /// Drops a player's live session; the next checkout reloads it from the
    /// collaborators. Returns whether a session was present.
    pub async fn evict(&self, user_id: Uuid) -> bool {
        self.sessions.lock().await.remove(&user_id).is_some()
    }

    /// Number of sessions held.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Returns `true` if no session is held.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

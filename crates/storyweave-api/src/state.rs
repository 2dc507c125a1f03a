//! Shared application state.

use storyweave_story::application::context::GameContext;
use storyweave_story::application::sessions::SessionRegistry;

/// Application state shared across all request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Collaborators used by every game and progress query.
    pub game: GameContext,
    /// Live game sessions, one per player.
    pub sessions: SessionRegistry,
}

impl AppState {
    /// Create new application state with no live sessions.
    #[must_use]
    pub fn new(game: GameContext) -> Self {
        let sessions = SessionRegistry::new(game.clone());
        Self { game, sessions }
    }
}

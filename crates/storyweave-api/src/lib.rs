//! Storyweave — HTTP API.
//!
//! Request/response surface over the story engine. Each player's session
//! stays live in memory between requests; it is loaded from the
//! collaborators on first use and persists every change back to them.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod telemetry;

use axum::Router;

use crate::state::AppState;

/// Builds the application router with every route mounted.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::game::router())
        .merge(routes::leaderboard::router())
        .merge(routes::profiles::router())
        .merge(routes::achievements::router());

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", api)
        .with_state(state)
}

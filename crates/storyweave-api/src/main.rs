//! Storyweave API server entry point.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use storyweave_api::config::AppConfig;
use storyweave_api::error::AppError;
use storyweave_api::state::AppState;
use storyweave_api::telemetry;
use storyweave_core::clock::SystemClock;
use storyweave_core::ports::StoryRepository;
use storyweave_store::pg_achievement_service::PgAchievementService;
use storyweave_store::pg_profile_store::PgProfileStore;
use storyweave_store::pg_score_ledger::PgScoreLedger;
use storyweave_store::pg_story_repository::PgStoryRepository;
use storyweave_store::schema;
use storyweave_store::yaml_story_repository::YamlStoryRepository;
use storyweave_story::application::context::GameContext;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;
    let tracer_provider = telemetry::init_tracing(config.otlp_endpoint.as_deref())?;

    tracing::info!("Starting Storyweave API server");

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;
    schema::run_migrations(&pool).await?;

    let stories: Arc<dyn StoryRepository> = match &config.story_seed_path {
        Some(path) => Arc::new(YamlStoryRepository::from_path(path)?),
        None => Arc::new(PgStoryRepository::new(pool.clone())),
    };
    let game = GameContext::new(
        stories,
        Arc::new(PgProfileStore::new(pool.clone())),
        Arc::new(PgAchievementService::new(pool.clone())),
        Arc::new(PgScoreLedger::new(pool)),
        Arc::new(SystemClock),
    );

    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = storyweave_api::app(AppState::new(game))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.socket_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    if let Some(provider) = tracer_provider
        && let Err(e) = provider.shutdown()
    {
        tracing::warn!(error = %e, "failed to flush traces");
    }

    Ok(())
}

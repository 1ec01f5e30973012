pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::db::Database;
use crate::services::generator::{ContentGenerator, DisabledGenerator, GeminiGenerator};
use crate::services::study::StudyService;
use crate::store::{MemoryStore, Store};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub study: StudyService,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, generator: Arc<dyn ContentGenerator>) -> Self {
        let study = StudyService::new(store.clone(), generator);
        Self { store, study }
    }
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let store: Arc<dyn Store> = match &config.database_url {
        Some(database_url) => {
            tracing::info!("Connecting to database...");
            let db = Database::connect(database_url, config.max_connections).await?;

            tracing::info!("Running migrations...");
            db.run_migrations().await?;

            Arc::new(db)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store; data will not persist");
            Arc::new(MemoryStore::new())
        }
    };

    let generator: Arc<dyn ContentGenerator> = match &config.gemini {
        Some(gemini) => {
            tracing::info!("Content generation enabled with model {}", gemini.model);
            Arc::new(GeminiGenerator::new(reqwest::Client::new(), gemini))
        }
        None => {
            tracing::warn!("GEMINI_API_KEY not set, flashcard generation is disabled");
            Arc::new(DisabledGenerator)
        }
    };

    let app = app(AppState::new(store, generator));

    let addr = config.bind_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the full router.
pub fn app(state: AppState) -> Router {
    let protected_routes = Router::new()
        // User routes
        .route("/api/users/me", get(routes::users::me))
        // Deck routes
        .route("/api/decks", post(routes::decks::create).get(routes::decks::list))
        .route(
            "/api/decks/:id",
            get(routes::decks::get).delete(routes::decks::delete),
        )
        .route("/api/decks/:id/cards", get(routes::decks::cards))
        // Flashcard routes
        .route("/api/flashcards", post(routes::flashcards::create))
        .route("/api/flashcards/generate", post(routes::flashcards::generate))
        .route("/api/flashcards/due", get(routes::flashcards::due))
        .route("/api/flashcards/:id", axum::routing::delete(routes::flashcards::delete))
        .route("/api/flashcards/:id/review", post(routes::flashcards::review))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            routes::auth::auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/users/register", post(routes::users::register))
        .merge(protected_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

//! Common test utilities and fixtures for integration tests.
//!
//! This module provides shared test infrastructure including:
//! - TestContext for setting up the app over an in-memory or PostgreSQL store
//! - A scripted content generator
//! - Authentication helpers
//!
//! # Requirements
//! Tests built with `TestContext::new` need nothing external. Tests built
//! with `TestContext::postgres` require DATABASE_URL to be set.

#![allow(dead_code)]

pub mod fixtures;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::HeaderValue;
use axum::Router;
use axum_test::TestServer;
use uuid::Uuid;

use study_assistant_backend::db::Database;
use study_assistant_backend::models::NewCard;
use study_assistant_backend::services::generator::{ContentGenerator, GenerationError};
use study_assistant_backend::store::{MemoryStore, Store};
use study_assistant_backend::{app, AppState};

/// Generator that replays a fixed response and records its calls.
#[derive(Default)]
pub struct ScriptedGenerator {
    cards: Vec<NewCard>,
    fail: bool,
    calls: Mutex<Vec<(String, u32)>>,
}

impl ScriptedGenerator {
    pub fn returning(cards: Vec<NewCard>) -> Self {
        Self {
            cards,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    /// `(text, count)` of every call so far.
    pub fn calls(&self) -> Vec<(String, u32)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentGenerator for ScriptedGenerator {
    async fn generate_flashcards(&self, text: &str, count: u32) -> Result<Vec<NewCard>, GenerationError> {
        self.calls.lock().unwrap().push((text.to_string(), count));
        if self.fail {
            return Err(GenerationError::Provider {
                status: 503,
                message: "model overloaded".to_string(),
            });
        }
        Ok(self.cards.clone())
    }
}

/// Test context holding the store, generator and router.
pub struct TestContext {
    pub store: Arc<dyn Store>,
    pub memory: Option<Arc<MemoryStore>>,
    pub generator: Arc<ScriptedGenerator>,
    app: Router,
}

impl TestContext {
    /// Context over a fresh in-memory store.
    pub fn new() -> Self {
        Self::with_generator(ScriptedGenerator::returning(fixtures::generated_cards(3)))
    }

    /// In-memory context with a custom generator.
    pub fn with_generator(generator: ScriptedGenerator) -> Self {
        let memory = Arc::new(MemoryStore::new());
        let generator = Arc::new(generator);
        let store: Arc<dyn Store> = memory.clone();
        let app = app(AppState::new(store.clone(), generator.clone()));

        Self {
            store,
            memory: Some(memory),
            generator,
            app,
        }
    }

    /// Context over PostgreSQL.
    ///
    /// # Panics
    /// Panics if DATABASE_URL is not set or database connection fails.
    pub async fn postgres() -> Self {
        dotenvy::dotenv().ok();

        let database_url =
            std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests");

        let db = Database::connect(&database_url, 5)
            .await
            .expect("Failed to connect to test database");

        db.run_migrations()
            .await
            .expect("Failed to run migrations");

        let store: Arc<dyn Store> = Arc::new(db);
        let generator = Arc::new(ScriptedGenerator::returning(fixtures::generated_cards(3)));
        let app = app(AppState::new(store.clone(), generator.clone()));

        Self {
            store,
            memory: None,
            generator,
            app,
        }
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    pub fn server(&self) -> TestServer {
        TestServer::new(self.router()).unwrap()
    }

    /// The in-memory store, for arming failure points.
    pub fn memory(&self) -> &MemoryStore {
        self.memory.as_deref().expect("context is not in-memory")
    }

    /// Create a test user and return its ID and token.
    pub async fn create_test_user(&self, name: Option<&str>) -> (Uuid, String) {
        let user = self
            .store
            .create_user(name)
            .await
            .expect("Failed to create test user");
        (user.id, user.token)
    }

    /// Get authorization header value for a token.
    pub fn auth_header_value(token: &str) -> HeaderValue {
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
    }
}

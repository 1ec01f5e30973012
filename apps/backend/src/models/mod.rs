//! Database models and API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// Re-export shared types from study-core
pub use study_core::types::{
    Deck, Flashcard, NewCard, NewDeck, PerformanceStats, Quality, SchedulingState,
};

use crate::store::StoreError;

// === Database Entity Types ===

/// Registered user. The token is the bearer credential.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub token: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

impl User {
    /// Create a user with a freshly generated token.
    pub fn new(name: Option<&str>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            token: Uuid::new_v4().to_string(),
            name: name.map(str::to_string),
            created_at: now,
            last_seen_at: now,
        }
    }
}

/// Deck stored in PostgreSQL
#[derive(Debug, Clone, FromRow)]
pub struct DbDeck {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub subject: Option<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub last_studied: Option<DateTime<Utc>>,
}

impl From<DbDeck> for Deck {
    fn from(row: DbDeck) -> Self {
        Deck {
            id: row.id,
            owner_id: row.owner_id,
            name: row.name,
            description: row.description,
            subject: row.subject,
            tags: row.tags,
            created_at: row.created_at,
            last_studied: row.last_studied,
        }
    }
}

/// Deck row joined with its derived card count
#[derive(Debug, Clone, FromRow)]
pub struct DbDeckWithCount {
    #[sqlx(flatten)]
    pub deck: DbDeck,
    pub card_count: i64,
}

/// Flashcard stored in PostgreSQL
#[derive(Debug, Clone, FromRow)]
pub struct DbFlashcard {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub deck_id: Uuid,
    pub front: String,
    pub back: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub interval_days: i32,
    pub ease_factor: f64,
    pub repetitions: i32,
    pub next_review: DateTime<Utc>,
    pub last_reviewed: Option<DateTime<Utc>>,
    pub total_reviews: i32,
    pub correct_reviews: i32,
    pub streak: i32,
    pub last_review_quality: Option<i16>,
}

impl DbFlashcard {
    /// Convert from the domain card
    pub fn from_card(card: &Flashcard) -> Result<Self, StoreError> {
        Ok(Self {
            id: card.id,
            owner_id: card.owner_id,
            deck_id: card.deck_id,
            front: card.front.clone(),
            back: card.back.clone(),
            tags: card.tags.clone(),
            created_at: card.created_at,
            interval_days: to_column(card.schedule.interval, "interval_days")?,
            ease_factor: card.schedule.ease_factor,
            repetitions: to_column(card.schedule.repetitions, "repetitions")?,
            next_review: card.schedule.next_review,
            last_reviewed: card.schedule.last_reviewed,
            total_reviews: to_column(card.stats.total_reviews, "total_reviews")?,
            correct_reviews: to_column(card.stats.correct_reviews, "correct_reviews")?,
            streak: to_column(card.stats.streak, "streak")?,
            last_review_quality: card.stats.last_review_quality.map(|q| i16::from(q.value())),
        })
    }

    /// Convert to the domain card
    pub fn into_card(self) -> Result<Flashcard, StoreError> {
        let last_review_quality = self
            .last_review_quality
            .map(|q| Quality::new(i64::from(q)))
            .transpose()
            .map_err(|e| StoreError::InvalidData(format!("card {}: {}", self.id, e)))?;

        Ok(Flashcard {
            id: self.id,
            owner_id: self.owner_id,
            deck_id: self.deck_id,
            front: self.front,
            back: self.back,
            tags: self.tags,
            created_at: self.created_at,
            schedule: SchedulingState {
                interval: from_column(self.interval_days, "interval_days")?,
                ease_factor: self.ease_factor,
                repetitions: from_column(self.repetitions, "repetitions")?,
                next_review: self.next_review,
                last_reviewed: self.last_reviewed,
            },
            stats: PerformanceStats {
                total_reviews: from_column(self.total_reviews, "total_reviews")?,
                correct_reviews: from_column(self.correct_reviews, "correct_reviews")?,
                streak: from_column(self.streak, "streak")?,
                last_review_quality,
            },
        })
    }
}

fn to_column(value: u32, column: &str) -> Result<i32, StoreError> {
    i32::try_from(value).map_err(|_| StoreError::InvalidData(format!("{} out of range: {}", column, value)))
}

fn from_column(value: i32, column: &str) -> Result<u32, StoreError> {
    u32::try_from(value).map_err(|_| StoreError::InvalidData(format!("negative {}: {}", column, value)))
}

/// Deck with its derived card count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckSummary {
    #[serde(flatten)]
    pub deck: Deck,
    pub card_count: u64,
}

impl From<DbDeckWithCount> for DeckSummary {
    fn from(row: DbDeckWithCount) -> Self {
        Self {
            deck: row.deck.into(),
            card_count: row.card_count.max(0) as u64,
        }
    }
}

// === API Request/Response Types ===

#[derive(Debug, Serialize, Deserialize)]
pub struct UserRegisterRequest {
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserRegisterResponse {
    pub user_id: Uuid,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserStatusResponse {
    pub user_id: Uuid,
    pub name: Option<String>,
    pub last_seen_at: DateTime<Utc>,
}

// Deck types
#[derive(Debug, Serialize, Deserialize)]
pub struct DeckListResponse {
    pub decks: Vec<DeckSummary>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteDeckResponse {
    pub deleted_cards: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CardListResponse {
    pub cards: Vec<Flashcard>,
}

// Flashcard types
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateCardRequest {
    pub deck_id: Uuid,
    #[serde(flatten)]
    pub card: NewCard,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateCardsRequest {
    pub deck_id: Uuid,
    pub text: String,
    #[serde(default = "default_generate_count")]
    pub count: u32,
}

fn default_generate_count() -> u32 {
    10
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateCardsResponse {
    pub count: usize,
    pub cards: Vec<Flashcard>,
}

/// Review payload. Quality is range-checked by the service, not at parse time.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReviewRequest {
    pub quality: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DueCardsQuery {
    pub deck_id: Option<Uuid>,
    pub limit: Option<u32>,
}

//! Persistence contract for users, decks and flashcards.
//!
//! Every deck and card lookup takes the owner id alongside the entity id, so
//! a record belonging to someone else is indistinguishable from a missing
//! one. Implementations do not enforce anything beyond that filter.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Deck, DeckSummary, Flashcard, User};

pub use memory::{FailPoint, MemoryStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[async_trait]
pub trait Store: Send + Sync {
    // Users
    async fn create_user(&self, name: Option<&str>) -> StoreResult<User>;
    async fn get_user_by_token(&self, token: &str) -> StoreResult<Option<User>>;
    async fn touch_user(&self, user_id: Uuid) -> StoreResult<()>;

    // Decks
    async fn insert_deck(&self, deck: &Deck) -> StoreResult<()>;
    async fn get_deck(&self, owner_id: Uuid, deck_id: Uuid) -> StoreResult<Option<Deck>>;

    /// Decks with card counts, most recently studied first.
    async fn list_decks(&self, owner_id: Uuid) -> StoreResult<Vec<DeckSummary>>;
    async fn count_cards(&self, deck_id: Uuid) -> StoreResult<u64>;
    async fn touch_deck_studied(&self, deck_id: Uuid, at: DateTime<Utc>) -> StoreResult<()>;

    /// Delete the deck record only. Returns false when no owned deck matched.
    async fn delete_deck(&self, owner_id: Uuid, deck_id: Uuid) -> StoreResult<bool>;
    async fn delete_cards_by_deck(&self, deck_id: Uuid) -> StoreResult<u64>;

    /// Delete a deck and then every card in it, returning the number of
    /// cards removed, or `None` when no owned deck matched.
    ///
    /// Not atomic: if card deletion fails the deck stays deleted and the
    /// error is returned. Stores with transactions should override this.
    async fn delete_deck_cascade(&self, owner_id: Uuid, deck_id: Uuid) -> StoreResult<Option<u64>> {
        if !self.delete_deck(owner_id, deck_id).await? {
            return Ok(None);
        }
        let deleted = self.delete_cards_by_deck(deck_id).await?;
        Ok(Some(deleted))
    }

    // Cards
    async fn insert_card(&self, card: &Flashcard) -> StoreResult<()>;
    /// Overwrite an existing owned card. Returns false, writing nothing, when
    /// the card no longer exists.
    async fn update_card(&self, card: &Flashcard) -> StoreResult<bool>;
    async fn get_card(&self, owner_id: Uuid, card_id: Uuid) -> StoreResult<Option<Flashcard>>;
    async fn list_cards(&self, owner_id: Uuid, deck_id: Uuid) -> StoreResult<Vec<Flashcard>>;

    /// Cards with `next_review <= now`, earliest first.
    async fn due_cards(
        &self,
        owner_id: Uuid,
        deck_id: Option<Uuid>,
        now: DateTime<Utc>,
        limit: u32,
    ) -> StoreResult<Vec<Flashcard>>;
    async fn delete_card(&self, owner_id: Uuid, card_id: Uuid) -> StoreResult<bool>;
}

//! Deck and flashcard lifecycle, and card review.

use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use study_core::{apply_review, Sm2};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::services::generator::ContentGenerator;
use crate::store::Store;

/// Default and maximum page size for the due queue.
pub const DEFAULT_DUE_LIMIT: u32 = 50;
pub const MAX_DUE_LIMIT: u32 = 500;

/// Owner-scoped operations on decks and cards.
#[derive(Clone)]
pub struct StudyService {
    store: Arc<dyn Store>,
    generator: Arc<dyn ContentGenerator>,
    scheduler: Sm2,
}

impl StudyService {
    pub fn new(store: Arc<dyn Store>, generator: Arc<dyn ContentGenerator>) -> Self {
        Self {
            store,
            generator,
            scheduler: Sm2::default(),
        }
    }

    // === Review ===

    /// Record a review of `card_id` with the given 0-5 quality.
    ///
    /// Nothing is written unless the quality is valid and the card is owned
    /// by `owner_id`. Updating the deck's last-studied time is best effort.
    pub async fn review_card(&self, owner_id: Uuid, card_id: Uuid, quality: i64) -> Result<Flashcard> {
        let quality = Quality::new(quality)?;

        let mut card = self
            .store
            .get_card(owner_id, card_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Card not found".to_string()))?;

        let now = Utc::now();
        apply_review(&mut card, quality, now, &self.scheduler)?;
        if !self.store.update_card(&card).await? {
            // Deleted between the read and the write.
            return Err(ApiError::NotFound("Card not found".to_string()));
        }

        if let Err(e) = self.store.touch_deck_studied(card.deck_id, now).await {
            tracing::warn!("Failed to update last studied for deck {}: {}", card.deck_id, e);
        }

        tracing::debug!(
            "Reviewed card {} with quality {}: next in {} days (ease {:.2})",
            card.id,
            quality.value(),
            card.schedule.interval,
            card.schedule.ease_factor
        );

        Ok(card)
    }

    /// Owned cards due for review, earliest first.
    pub async fn due_cards(&self, owner_id: Uuid, deck_id: Option<Uuid>, limit: Option<u32>) -> Result<Vec<Flashcard>> {
        let limit = limit.unwrap_or(DEFAULT_DUE_LIMIT).clamp(1, MAX_DUE_LIMIT);
        let cards = self.store.due_cards(owner_id, deck_id, Utc::now(), limit).await?;
        Ok(cards)
    }

    // === Decks ===

    pub async fn create_deck(&self, owner_id: Uuid, new_deck: NewDeck) -> Result<Deck> {
        let deck = Deck::new(owner_id, new_deck, Utc::now())?;
        self.store.insert_deck(&deck).await?;

        tracing::info!("Created deck {} for user {}", deck.id, owner_id);
        Ok(deck)
    }

    pub async fn list_decks(&self, owner_id: Uuid) -> Result<Vec<DeckSummary>> {
        Ok(self.store.list_decks(owner_id).await?)
    }

    pub async fn get_deck(&self, owner_id: Uuid, deck_id: Uuid) -> Result<DeckSummary> {
        let deck = self.owned_deck(owner_id, deck_id).await?;
        let card_count = self.store.count_cards(deck.id).await?;
        Ok(DeckSummary { deck, card_count })
    }

    /// Delete a deck and all of its cards, returning how many cards went.
    pub async fn delete_deck(&self, owner_id: Uuid, deck_id: Uuid) -> Result<u64> {
        let deleted = self
            .store
            .delete_deck_cascade(owner_id, deck_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Deck not found".to_string()))?;

        tracing::info!("Deleted deck {} and {} cards", deck_id, deleted);
        Ok(deleted)
    }

    // === Cards ===

    pub async fn create_card(&self, owner_id: Uuid, deck_id: Uuid, new_card: NewCard) -> Result<Flashcard> {
        let deck = self.owned_deck(owner_id, deck_id).await?;
        self.add_card(owner_id, deck.id, new_card).await
    }

    pub async fn list_cards(&self, owner_id: Uuid, deck_id: Uuid) -> Result<Vec<Flashcard>> {
        let deck = self.owned_deck(owner_id, deck_id).await?;
        Ok(self.store.list_cards(owner_id, deck.id).await?)
    }

    pub async fn delete_card(&self, owner_id: Uuid, card_id: Uuid) -> Result<()> {
        if !self.store.delete_card(owner_id, card_id).await? {
            return Err(ApiError::NotFound("Card not found".to_string()));
        }
        Ok(())
    }

    /// Generate `count` cards from `text` into an owned deck.
    ///
    /// All inserts are issued together. If any fail, the first error is
    /// returned once the rest have finished; cards already saved are kept.
    pub async fn bulk_generate_cards(
        &self,
        owner_id: Uuid,
        deck_id: Uuid,
        text: &str,
        count: u32,
    ) -> Result<Vec<Flashcard>> {
        if text.trim().is_empty() {
            return Err(ApiError::InvalidInput("text is required".to_string()));
        }
        if count == 0 {
            return Err(ApiError::InvalidInput("count must be at least 1".to_string()));
        }

        let deck = self.owned_deck(owner_id, deck_id).await?;
        let generated = self.generator.generate_flashcards(text, count).await?;

        let results = join_all(
            generated
                .into_iter()
                .map(|new_card| self.add_card(owner_id, deck.id, new_card)),
        )
        .await;

        let total = results.len();
        let mut cards = Vec::with_capacity(total);
        let mut first_error = None;
        for result in results {
            match result {
                Ok(card) => cards.push(card),
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }

        if let Some(e) = first_error {
            tracing::warn!(
                "Generated cards for deck {} partially saved: {} of {}",
                deck.id,
                cards.len(),
                total
            );
            return Err(e);
        }

        tracing::info!("Generated {} cards into deck {}", cards.len(), deck.id);
        Ok(cards)
    }

    async fn owned_deck(&self, owner_id: Uuid, deck_id: Uuid) -> Result<Deck> {
        self.store
            .get_deck(owner_id, deck_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Deck not found".to_string()))
    }

    async fn add_card(&self, owner_id: Uuid, deck_id: Uuid, new_card: NewCard) -> Result<Flashcard> {
        let card = Flashcard::new(owner_id, deck_id, new_card, Utc::now())?;
        self.store.insert_card(&card).await?;
        Ok(card)
    }
}

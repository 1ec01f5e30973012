//! In-memory store.
//!
//! Used when no database is configured, and by the test suite. Failure points
//! can be armed to exercise the error paths of the review and lifecycle code.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::models::{Deck, DeckSummary, Flashcard, User};

/// Store operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    InsertCard,
    UpdateCard,
    TouchDeck,
    DeleteCards,
}

#[derive(Default)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    decks: HashMap<Uuid, Deck>,
    cards: HashMap<Uuid, Flashcard>,
    /// Remaining successful calls before each armed operation fails.
    armed: HashMap<FailPoint, usize>,
}

impl MemoryState {
    fn check(&mut self, point: FailPoint) -> StoreResult<()> {
        match self.armed.get_mut(&point) {
            Some(0) => Err(StoreError::Unavailable(format!("{:?} failed", point))),
            Some(remaining) => {
                *remaining -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn card_count(&self, deck_id: Uuid) -> u64 {
        self.cards.values().filter(|c| c.deck_id == deck_id).count() as u64
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `point` fail after `after` more successful calls.
    pub async fn fail_after(&self, point: FailPoint, after: usize) {
        self.state.write().await.armed.insert(point, after);
    }

    /// Disarm a failure point.
    pub async fn recover(&self, point: FailPoint) {
        self.state.write().await.armed.remove(&point);
    }

    /// Total number of cards across all owners.
    pub async fn card_total(&self) -> usize {
        self.state.read().await.cards.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, name: Option<&str>) -> StoreResult<User> {
        let user = User::new(name);
        self.state.write().await.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user_by_token(&self, token: &str) -> StoreResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.token == token).cloned())
    }

    async fn touch_user(&self, user_id: Uuid) -> StoreResult<()> {
        if let Some(user) = self.state.write().await.users.get_mut(&user_id) {
            user.last_seen_at = Utc::now();
        }
        Ok(())
    }

    async fn insert_deck(&self, deck: &Deck) -> StoreResult<()> {
        self.state.write().await.decks.insert(deck.id, deck.clone());
        Ok(())
    }

    async fn get_deck(&self, owner_id: Uuid, deck_id: Uuid) -> StoreResult<Option<Deck>> {
        let state = self.state.read().await;
        Ok(state
            .decks
            .get(&deck_id)
            .filter(|d| d.owner_id == owner_id)
            .cloned())
    }

    async fn list_decks(&self, owner_id: Uuid) -> StoreResult<Vec<DeckSummary>> {
        let state = self.state.read().await;
        let mut decks: Vec<DeckSummary> = state
            .decks
            .values()
            .filter(|d| d.owner_id == owner_id)
            .map(|d| DeckSummary {
                deck: d.clone(),
                card_count: state.card_count(d.id),
            })
            .collect();

        // Studied decks first (latest first), then by creation, newest first.
        decks.sort_by(|a, b| {
            b.deck
                .last_studied
                .cmp(&a.deck.last_studied)
                .then(b.deck.created_at.cmp(&a.deck.created_at))
        });
        Ok(decks)
    }

    async fn count_cards(&self, deck_id: Uuid) -> StoreResult<u64> {
        Ok(self.state.read().await.card_count(deck_id))
    }

    async fn touch_deck_studied(&self, deck_id: Uuid, at: DateTime<Utc>) -> StoreResult<()> {
        let mut state = self.state.write().await;
        state.check(FailPoint::TouchDeck)?;
        if let Some(deck) = state.decks.get_mut(&deck_id) {
            deck.last_studied = Some(at);
        }
        Ok(())
    }

    async fn delete_deck(&self, owner_id: Uuid, deck_id: Uuid) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        let owned = state
            .decks
            .get(&deck_id)
            .is_some_and(|d| d.owner_id == owner_id);
        if owned {
            state.decks.remove(&deck_id);
        }
        Ok(owned)
    }

    async fn delete_cards_by_deck(&self, deck_id: Uuid) -> StoreResult<u64> {
        let mut state = self.state.write().await;
        state.check(FailPoint::DeleteCards)?;
        let before = state.cards.len();
        state.cards.retain(|_, c| c.deck_id != deck_id);
        Ok((before - state.cards.len()) as u64)
    }

    async fn insert_card(&self, card: &Flashcard) -> StoreResult<()> {
        let mut state = self.state.write().await;
        state.check(FailPoint::InsertCard)?;
        state.cards.insert(card.id, card.clone());
        Ok(())
    }

    async fn update_card(&self, card: &Flashcard) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        state.check(FailPoint::UpdateCard)?;
        match state.cards.get_mut(&card.id) {
            Some(stored) if stored.owner_id == card.owner_id => {
                *stored = card.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn get_card(&self, owner_id: Uuid, card_id: Uuid) -> StoreResult<Option<Flashcard>> {
        let state = self.state.read().await;
        Ok(state
            .cards
            .get(&card_id)
            .filter(|c| c.owner_id == owner_id)
            .cloned())
    }

    async fn list_cards(&self, owner_id: Uuid, deck_id: Uuid) -> StoreResult<Vec<Flashcard>> {
        let state = self.state.read().await;
        let mut cards: Vec<Flashcard> = state
            .cards
            .values()
            .filter(|c| c.owner_id == owner_id && c.deck_id == deck_id)
            .cloned()
            .collect();
        cards.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(cards)
    }

    async fn due_cards(
        &self,
        owner_id: Uuid,
        deck_id: Option<Uuid>,
        now: DateTime<Utc>,
        limit: u32,
    ) -> StoreResult<Vec<Flashcard>> {
        let state = self.state.read().await;
        let mut cards: Vec<Flashcard> = state
            .cards
            .values()
            .filter(|c| c.owner_id == owner_id)
            .filter(|c| deck_id.map_or(true, |d| c.deck_id == d))
            .filter(|c| c.is_due(now))
            .cloned()
            .collect();
        cards.sort_by(|a, b| a.schedule.next_review.cmp(&b.schedule.next_review));
        cards.truncate(limit as usize);
        Ok(cards)
    }

    async fn delete_card(&self, owner_id: Uuid, card_id: Uuid) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        let owned = state
            .cards
            .get(&card_id)
            .is_some_and(|c| c.owner_id == owner_id);
        if owned {
            state.cards.remove(&card_id);
        }
        Ok(owned)
    }
}

//! Core types for the study assistant.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::algorithm::Sm2;
use crate::error::{CoreError, Result};

/// Self-assessed recall quality on the 0-5 scale.
///
/// Values outside the scale are rejected at construction, so a `Quality` is
/// always safe to schedule with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Quality(u8);

impl Quality {
    pub const MIN: u8 = 0;
    pub const MAX: u8 = 5;

    /// Validate a raw score.
    pub fn new(value: i64) -> Result<Self> {
        if (Self::MIN as i64..=Self::MAX as i64).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(CoreError::InvalidQuality(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Quality {
    type Error = CoreError;

    fn try_from(value: i64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Quality> for u8 {
    fn from(quality: Quality) -> Self {
        quality.0
    }
}

/// Scheduling state of a card. Only the review engine writes these fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingState {
    /// Days until the next review.
    pub interval: u32,
    pub ease_factor: f64,
    /// Number of reviews performed, successful or not.
    pub repetitions: u32,
    pub next_review: DateTime<Utc>,
    pub last_reviewed: Option<DateTime<Utc>>,
}

impl SchedulingState {
    /// State of a card that has never been reviewed, with default parameters.
    pub fn new(now: DateTime<Utc>) -> Self {
        Sm2::default().initial_state(now)
    }
}

/// Per-card review counters. Audit only, never read by the scheduler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceStats {
    pub total_reviews: u32,
    pub correct_reviews: u32,
    /// Consecutive successful reviews.
    pub streak: u32,
    pub last_review_quality: Option<Quality>,
}

/// A named, owned collection of flashcards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub last_studied: Option<DateTime<Utc>>,
}

impl Deck {
    /// Build a new deck for `owner_id`. The name must not be blank.
    pub fn new(owner_id: Uuid, new_deck: NewDeck, now: DateTime<Utc>) -> Result<Self> {
        let name = required(new_deck.name, "name")?;

        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            name,
            description: optional(new_deck.description),
            subject: optional(new_deck.subject),
            tags: normalize_tags(new_deck.tags),
            created_at: now,
            last_studied: None,
        })
    }
}

/// Fields supplied when creating a deck.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewDeck {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A flashcard with its scheduling state and counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flashcard {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub deck_id: Uuid,
    pub front: String,
    pub back: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub schedule: SchedulingState,
    #[serde(flatten)]
    pub stats: PerformanceStats,
}

impl Flashcard {
    /// Build a new card in `deck_id`. Front and back must not be blank.
    pub fn new(owner_id: Uuid, deck_id: Uuid, new_card: NewCard, now: DateTime<Utc>) -> Result<Self> {
        let front = required(new_card.front, "front")?;
        let back = required(new_card.back, "back")?;

        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            deck_id,
            front,
            back,
            tags: normalize_tags(new_card.tags),
            created_at: now,
            schedule: SchedulingState::new(now),
            stats: PerformanceStats::default(),
        })
    }

    /// Whether the card is due at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.schedule.next_review <= now
    }
}

/// Card content supplied by a user or produced by content generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewCard {
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Trim tags, drop empty ones and duplicates, keeping first-seen order.
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty() && seen.insert(t.clone()))
        .collect()
}

fn required(value: String, field: &'static str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

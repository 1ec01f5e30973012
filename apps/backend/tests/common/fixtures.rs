//! Test fixtures and factory functions for creating test data.

use serde_json::{json, Value};
use uuid::Uuid;

use study_assistant_backend::models::NewCard;

/// Cards a generator would return for `count` source facts.
pub fn generated_cards(count: usize) -> Vec<NewCard> {
    (0..count)
        .map(|i| NewCard {
            front: format!("Question {}?", i + 1),
            back: format!("Answer {}.", i + 1),
            tags: vec!["generated".to_string()],
        })
        .collect()
}

/// Create a deck request body.
pub fn deck_request(name: &str) -> Value {
    json!({
        "name": name,
        "description": "Test deck",
        "subject": "testing",
        "tags": ["unit", "test", "unit"]
    })
}

/// Create a card request body.
pub fn card_request(deck_id: Uuid, front: &str, back: &str) -> Value {
    json!({
        "deck_id": deck_id,
        "front": front,
        "back": back,
        "tags": ["basics"]
    })
}

/// Create a review request body.
pub fn review_request(quality: i64) -> Value {
    json!({ "quality": quality })
}

/// Create a generation request body.
pub fn generate_request(deck_id: Uuid, text: &str, count: u32) -> Value {
    json!({
        "deck_id": deck_id,
        "text": text,
        "count": count
    })
}

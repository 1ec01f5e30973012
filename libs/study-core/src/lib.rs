//! Core study library shared by the backend.
//!
//! Provides:
//! - SM-2 spaced repetition scheduler
//! - Review application (scheduling, counters, due dates)
//! - Shared types (Deck, Flashcard, Quality, etc.)

pub mod algorithm;
pub mod error;
pub mod review;
pub mod types;

pub use algorithm::{sm2::compute_next_state, SchedulingResult, Sm2};
pub use error::{CoreError, Result};
pub use review::{add_days, apply_review};
pub use types::{
    normalize_tags, Deck, Flashcard, NewCard, NewDeck, PerformanceStats, Quality, SchedulingState,
};

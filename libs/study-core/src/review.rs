//! Applying a review to a card.
//!
//! This is the in-memory half of a review: scheduling, counters and dates.
//! Persisting the card and touching its deck are left to the caller.

use chrono::{DateTime, Days, Utc};

use crate::algorithm::Sm2;
use crate::error::{CoreError, Result};
use crate::types::{Flashcard, Quality};

/// Apply a review with `quality` at `now`.
///
/// The card is left untouched when an error is returned.
pub fn apply_review(card: &mut Flashcard, quality: Quality, now: DateTime<Utc>, sm2: &Sm2) -> Result<()> {
    let next = sm2.compute_next_state(quality, card.schedule.interval, card.schedule.ease_factor);
    let next_review = add_days(now, next.interval)?;

    let schedule = &mut card.schedule;
    schedule.interval = next.interval;
    schedule.ease_factor = next.ease_factor;
    schedule.repetitions += 1;
    schedule.last_reviewed = Some(now);
    schedule.next_review = next_review;

    let stats = &mut card.stats;
    stats.last_review_quality = Some(quality);
    stats.total_reviews += 1;
    if sm2.passes(quality) {
        stats.correct_reviews += 1;
        stats.streak += 1;
    } else {
        stats.streak = 0;
    }

    Ok(())
}

/// Add whole calendar days to `from`, keeping the time of day.
pub fn add_days(from: DateTime<Utc>, days: u32) -> Result<DateTime<Utc>> {
    from.checked_add_days(Days::new(u64::from(days)))
        .ok_or(CoreError::ScheduleOutOfRange { interval: days })
}

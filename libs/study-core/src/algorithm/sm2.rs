//! SM-2 spaced repetition algorithm.
//!
//! Based on SuperMemo 2, with one simplification: a failed recall resets the
//! interval but leaves the ease factor alone.

use chrono::{DateTime, Utc};

use super::SchedulingResult;
use crate::types::{Quality, SchedulingState};

/// SM-2 scheduler parameters.
#[derive(Debug, Clone)]
pub struct Sm2 {
    /// Interval of a new card, and of any card after a failed recall.
    pub initial_interval: u32,
    pub initial_ease: f64,
    pub minimum_ease: f64,
    /// Interval after the first successful review of a card at the initial interval.
    pub graduating_interval: u32,
    /// Lowest quality that counts as a successful recall.
    pub passing_quality: u8,
}

impl Default for Sm2 {
    fn default() -> Self {
        Self {
            initial_interval: 1,
            initial_ease: 2.5,
            minimum_ease: 1.3,
            graduating_interval: 6,
            passing_quality: 3,
        }
    }
}

impl Sm2 {
    /// Whether `quality` counts as a successful recall.
    pub fn passes(&self, quality: Quality) -> bool {
        quality.value() >= self.passing_quality
    }

    /// Scheduling state of a card that has never been reviewed, due at `now`.
    pub fn initial_state(&self, now: DateTime<Utc>) -> SchedulingState {
        SchedulingState {
            interval: self.initial_interval,
            ease_factor: self.initial_ease,
            repetitions: 0,
            next_review: now,
            last_reviewed: None,
        }
    }

    /// Compute the next interval and ease factor after a review.
    pub fn compute_next_state(
        &self,
        quality: Quality,
        previous_interval: u32,
        previous_ease: f64,
    ) -> SchedulingResult {
        if !self.passes(quality) {
            return SchedulingResult {
                interval: self.initial_interval,
                ease_factor: previous_ease,
            };
        }

        let miss = f64::from(Quality::MAX - quality.value());
        let ease_factor = (previous_ease + (0.1 - miss * (0.08 + miss * 0.02))).max(self.minimum_ease);

        let interval = if previous_interval == self.initial_interval {
            self.graduating_interval
        } else {
            // f64::round rounds half away from zero; the cast saturates.
            (f64::from(previous_interval) * ease_factor).round().max(1.0) as u32
        };

        SchedulingResult {
            interval,
            ease_factor,
        }
    }
}

/// Schedule with the default parameters.
pub fn compute_next_state(quality: Quality, previous_interval: u32, previous_ease: f64) -> SchedulingResult {
    Sm2::default().compute_next_state(quality, previous_interval, previous_ease)
}

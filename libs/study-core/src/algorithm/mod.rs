//! Spaced repetition scheduling.

pub mod sm2;

pub use sm2::Sm2;

/// Scheduler output for a single review.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulingResult {
    /// Days until the next review, at least 1.
    pub interval: u32,
    /// Ease factor, never below the scheduler's minimum.
    pub ease_factor: f64,
}

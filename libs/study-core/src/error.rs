//! Error types for study-core.

use thiserror::Error;

/// Result type alias using CoreError.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised by the pure review engine.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("quality must be between 0 and 5, got {0}")]
    InvalidQuality(i64),

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("next review date is out of range for an interval of {interval} days")]
    ScheduleOutOfRange { interval: u32 },
}

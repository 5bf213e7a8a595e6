//! Guess events, the raw evidence behind every expertise score.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One answer to one vocabulary item.
///
/// Serialized as `{"correct": bool, "date": <epoch millis>}`, the layout
/// shared by both stats document shapes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GuessEvent {
    /// Whether the learner answered correctly.
    pub correct: bool,
    /// When the answer was given.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub date: DateTime<Utc>,
}

impl GuessEvent {
    /// Create a guess event at the given instant.
    pub fn new(correct: bool, date: DateTime<Utc>) -> Self {
        Self { correct, date }
    }

    /// A correct answer at `date`.
    pub fn correct_at(date: DateTime<Utc>) -> Self {
        Self::new(true, date)
    }

    /// An incorrect answer (or a revealed answer) at `date`.
    pub fn incorrect_at(date: DateTime<Utc>) -> Self {
        Self::new(false, date)
    }

    /// Age of this event in fractional days relative to `now`.
    ///
    /// Events stamped in the future have age zero.
    pub fn age_days(&self, now: DateTime<Utc>) -> f64 {
        let millis = (now - self.date).num_milliseconds().max(0);
        millis as f64 / MILLIS_PER_DAY
    }
}

/// Milliseconds in one day.
pub const MILLIS_PER_DAY: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

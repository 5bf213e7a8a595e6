//! Eviction of stale guess history.
//!
//! Guesses older than the eviction window are dropped. A word whose every
//! guess is stale is deleted outright, so it no longer counts as attempted.
//! Eviction is idempotent; running it twice with the same `now` changes
//! nothing the second time.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::stats::GuessEvent;

/// Outcome of one eviction pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvictionReport {
    /// Whether any history was modified (the caller should re-persist).
    pub changed: bool,
    /// Number of guesses removed.
    pub removed_count: u64,
    /// How many of the removed guesses were correct.
    pub removed_correct: u64,
    /// Number of words deleted because nothing recent was left.
    pub keys_deleted: u64,
}

/// Oldest instant a guess may have and still be kept (exclusive).
pub fn eviction_threshold(now: DateTime<Utc>, max_age_days: u32) -> DateTime<Utc> {
    now - Duration::days(i64::from(max_age_days))
}

/// Drop every guess dated at or before `threshold`.
pub fn evict_before(
    word_guesses: &mut BTreeMap<String, Vec<GuessEvent>>,
    threshold: DateTime<Utc>,
) -> EvictionReport {
    let mut report = EvictionReport::default();

    word_guesses.retain(|_, guesses| {
        let before = guesses.len();
        let before_correct = guesses.iter().filter(|g| g.correct).count();

        guesses.retain(|g| g.date > threshold);

        let removed = before - guesses.len();
        if removed > 0 {
            let after_correct = guesses.iter().filter(|g| g.correct).count();
            report.changed = true;
            report.removed_count += removed as u64;
            report.removed_correct += (before_correct - after_correct) as u64;
        }

        if guesses.is_empty() {
            report.keys_deleted += 1;
            report.changed = true;
            return false;
        }
        true
    });

    report
}

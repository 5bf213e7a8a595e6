//! CLI commands for Kalike.
//!
//! This module provides CLI commands for Kalike, organized into:
//! - **Practice commands**: record, reveal, check, game (answers go in)
//! - **Progress commands**: level, stats, words (expertise comes out)
//! - **Maintenance**: maintain evict, export, import, reset

// Practice commands
pub mod record;

// Progress commands
pub mod stats;
pub mod words;

// Maintenance
pub mod maintain;

pub use maintain::MaintainCommand;
pub use record::RecordCommand;
pub use stats::StatsCommand;
pub use words::WordsCommand;

use crate::config::Config;
use crate::stats::GuessEvent;
use crate::vocabulary::Vocabulary;

/// Pick the vocabulary size used for coverage.
///
/// An explicit size wins, then the loaded vocabulary's length, then the
/// configured default.
pub fn resolve_vocabulary_size(
    explicit: Option<usize>,
    vocabulary: Option<&Vocabulary>,
    config: &Config,
) -> usize {
    explicit
        .or_else(|| vocabulary.map(Vocabulary::len))
        .unwrap_or(config.vocabulary.size as usize)
}

/// Render a guess history as marks, oldest first: `+` correct, `-` wrong.
pub fn history_marks(guesses: &[GuessEvent]) -> String {
    guesses
        .iter()
        .map(|g| if g.correct { '+' } else { '-' })
        .collect()
}

/// Format a 0.0-1.0 score as a percentage with one decimal.
pub fn format_score(score: f64) -> String {
    format!("{:.1}%", score * 100.0)
}

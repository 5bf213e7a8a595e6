//! Expertise tracking for Kalike.
//!
//! Every answer becomes a timestamped [`GuessEvent`] in the word's history.
//! Histories are scored with an exponential recency weight and a small-sample
//! confidence blend, aggregated into a coverage-adjusted overall expertise,
//! and mapped onto a ten-tier level ladder. Guesses older than the eviction
//! window are dropped.

pub mod document;
pub mod eviction;
pub mod guess;
pub mod levels;
pub mod scoring;
pub mod user_stats;

pub use document::{DocumentShape, StatsDocument};
pub use eviction::{evict_before, eviction_threshold, EvictionReport};
pub use guess::GuessEvent;
pub use levels::{level_for, ExpertiseLevel, LevelResult, EXPERTISE_LEVELS};
pub use scoring::{coverage_ratio, overall_expertise, word_expertise, CoverageStage};
pub use user_stats::{
    ExpertiseDistribution, ExpertiseSummary, Stats, UserStats, WordAccuracy, WordExpertise,
};

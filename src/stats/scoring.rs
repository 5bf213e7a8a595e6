//! Expertise scoring for Kalike.
//!
//! Two layers:
//! - Per-word mastery: exponentially time-weighted accuracy, shrunk toward an
//!   "uncertain" baseline until a word has enough attempts.
//! - Overall expertise: the mean attempted-word score, scaled by how much of
//!   the vocabulary has been attempted (coverage). Four coverage regimes keep
//!   early scores deliberately low and converge on the whole-vocabulary
//!   average once coverage is high.
//!
//! The regime breakpoints and factors come from [`ExpertiseConfig`] and its
//! defaults are a behavioral contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ExpertiseConfig;
use crate::stats::GuessEvent;

/// Clamp a score into [0.0, 1.0]. NaN becomes 0.0.
pub fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Recency weight of one guess: `exp(-age_days / halflife_days)`.
pub fn recency_weight(guess: &GuessEvent, halflife_days: f64, now: DateTime<Utc>) -> f64 {
    (-guess.age_days(now) / halflife_days).exp()
}

/// Calculate the mastery score (0.0 to 1.0) of one word from its guesses.
///
/// Returns 0.0 for an empty history.
pub fn word_expertise(guesses: &[GuessEvent], config: &ExpertiseConfig, now: DateTime<Utc>) -> f64 {
    if guesses.is_empty() {
        return 0.0;
    }

    let mut weighted_correct = 0.0;
    let mut total_weight = 0.0;
    for guess in guesses {
        let weight = recency_weight(guess, config.halflife_days, now);
        if guess.correct {
            weighted_correct += weight;
        }
        total_weight += weight;
    }

    if total_weight == 0.0 {
        return 0.0;
    }
    let raw = weighted_correct / total_weight;

    let confidence =
        (guesses.len() as f64 / f64::from(config.confidence_min_attempts.max(1))).min(1.0);
    let blended = raw * confidence + config.uncertain_baseline * (1.0 - confidence);

    clamp01(blended)
}

/// Coverage regime used for the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageStage {
    /// Below the very-early threshold: flat penalty on the attempted average.
    VeryEarly,
    /// Linear blend from the minimum factor up to the full attempted average.
    Early,
    /// Attempted average reduced in proportion to what is left unattempted.
    Middle,
    /// Whole-vocabulary average, unattempted words count as zero.
    Advanced,
}

impl CoverageStage {
    /// Classify a coverage ratio.
    pub fn for_coverage(coverage: f64, config: &ExpertiseConfig) -> Self {
        if coverage < config.very_early_threshold {
            Self::VeryEarly
        } else if coverage < config.early_threshold {
            Self::Early
        } else if coverage < config.middle_threshold {
            Self::Middle
        } else {
            Self::Advanced
        }
    }

    /// Human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::VeryEarly => "Very early",
            Self::Early => "Early",
            Self::Middle => "Middle",
            Self::Advanced => "Advanced",
        }
    }
}

/// Coverage ratio of `attempted` words over a vocabulary, capped at 1.0.
///
/// An empty vocabulary counts as fully covered.
pub fn coverage_ratio(attempted: usize, vocabulary_size: usize) -> f64 {
    if vocabulary_size == 0 {
        return 1.0;
    }
    (attempted as f64 / vocabulary_size as f64).min(1.0)
}

/// Calculate overall expertise from the scores of every attempted word.
///
/// `scores` holds one entry per word with a non-empty history. Returns 0.0
/// when nothing has been attempted.
pub fn overall_expertise(scores: &[f64], vocabulary_size: usize, config: &ExpertiseConfig) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }

    let total: f64 = scores.iter().sum();
    let average = total / scores.len() as f64;
    let coverage = coverage_ratio(scores.len(), vocabulary_size);

    let adjusted = match CoverageStage::for_coverage(coverage, config) {
        CoverageStage::VeryEarly => average * config.very_early_penalty,
        CoverageStage::Early => {
            let normalized = (coverage - config.very_early_threshold)
                / (config.early_threshold - config.very_early_threshold);
            let blend = config.early_min_blend + (1.0 - config.early_min_blend) * normalized;
            average * blend
        }
        CoverageStage::Middle => {
            let unattempted_penalty = (1.0 - coverage) * config.middle_max_penalty;
            average * (1.0 - unattempted_penalty)
        }
        CoverageStage::Advanced => {
            // More attempted words than vocabulary entries (or an empty
            // vocabulary) falls back to the attempted count.
            let denominator = vocabulary_size.max(scores.len());
            total / denominator as f64
        }
    };

    clamp01(adjusted)
}

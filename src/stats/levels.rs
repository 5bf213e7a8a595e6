//! The level ladder: maps overall expertise onto ten named tiers.
//!
//! Bands are `[min, max)` except the last, which also includes 1.0.

use serde::Serialize;

use crate::stats::scoring::clamp01;

/// One tier of the level ladder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExpertiseLevel {
    /// Tier index, 0-based.
    pub level: u8,
    /// Display name.
    pub name: &'static str,
    /// Inclusive lower bound.
    pub min_expertise: f64,
    /// Exclusive upper bound (inclusive for the last tier).
    pub max_expertise: f64,
}

const fn tier(level: u8, name: &'static str, min: f64, max: f64) -> ExpertiseLevel {
    ExpertiseLevel {
        level,
        name,
        min_expertise: min,
        max_expertise: max,
    }
}

/// The ladder, ordered from lowest to highest tier.
pub const EXPERTISE_LEVELS: [ExpertiseLevel; 10] = [
    tier(0, "Earthworm", 0.00, 0.04),
    tier(1, "Blind Snake", 0.04, 0.12),
    tier(2, "Green Vine Snake", 0.12, 0.24),
    tier(3, "Rat Snake", 0.24, 0.38),
    tier(4, "Checkered Keelback", 0.38, 0.54),
    tier(5, "Russell's Viper", 0.54, 0.72),
    tier(6, "Spectacled Cobra", 0.72, 0.80),
    tier(7, "Common Krait", 0.80, 0.87),
    tier(8, "Reticulated Python", 0.87, 0.94),
    tier(9, "King Cobra", 0.94, 1.00),
];

/// Where a learner sits on the ladder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelResult {
    /// Tier index.
    pub level: u8,
    /// Tier name.
    pub name: &'static str,
    /// Overall expertise the tier was derived from.
    pub overall_expertise: f64,
    /// Overall expertise as a rounded percentage.
    pub expertise_percentage: u32,
    /// Rounded percentage of the way through the current tier.
    pub progress_in_level: u32,
    /// The following tier, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_level: Option<ExpertiseLevel>,
    /// Whether this is the top tier.
    pub is_max_level: bool,
}

impl LevelResult {
    /// One-line description, e.g. `Rat Snake (40% to Checkered Keelback)`.
    pub fn describe(&self) -> String {
        match &self.next_level {
            Some(next) => format!(
                "{} ({}% to {})",
                self.name, self.progress_in_level, next.name
            ),
            None => format!("{} (Master Level)", self.name),
        }
    }
}

/// Look up the tier for an overall expertise value.
///
/// Searches from the top so a value sitting exactly on a boundary lands in
/// the higher tier. Out-of-range input is clamped first.
pub fn level_for(overall: f64) -> LevelResult {
    let overall = clamp01(overall);
    let index = EXPERTISE_LEVELS
        .iter()
        .rposition(|tier| tier.min_expertise <= overall)
        .unwrap_or(0);
    let current = EXPERTISE_LEVELS[index];

    let width = current.max_expertise - current.min_expertise;
    let progress = if width > 0.0 {
        clamp01((overall - current.min_expertise) / width)
    } else {
        1.0
    };

    let next_level = EXPERTISE_LEVELS.get(index + 1).copied();

    LevelResult {
        level: current.level,
        name: current.name,
        overall_expertise: overall,
        expertise_percentage: (overall * 100.0).round() as u32,
        progress_in_level: (progress * 100.0).round() as u32,
        is_max_level: next_level.is_none(),
        next_level,
    }
}

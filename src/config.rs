//! Configuration loading for Kalike.
//!
//! Configuration follows a precedence chain:
//! 1. Environment variables (highest priority)
//! 2. User config (`~/.kalike/config.toml` or `$KALIKE_HOME/config.toml`)
//! 3. Defaults (lowest priority)
//!
//! All configuration is optional. The defaults reproduce the tuned expertise
//! curve exactly; changing them changes every learner's reported level.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{KalikeError, Result};

/// Main configuration struct for Kalike.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Expertise scoring tuning.
    pub expertise: ExpertiseConfig,
    /// Stale history eviction.
    pub eviction: EvictionConfig,
    /// Vocabulary source.
    pub vocabulary: VocabularyConfig,
}

/// Tuning parameters for per-word and overall expertise.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExpertiseConfig {
    /// Days for a guess's weight to fall by a factor of e.
    pub halflife_days: f64,
    /// Attempts needed before a word's score is fully trusted.
    pub confidence_min_attempts: u32,
    /// Score that low-evidence words are pulled toward.
    pub uncertain_baseline: f64,
    /// Coverage below which the learner is "very early".
    pub very_early_threshold: f64,
    /// Coverage below which the learner is "early".
    pub early_threshold: f64,
    /// Coverage below which the learner is "middle".
    pub middle_threshold: f64,
    /// Very early: share of the attempted average that counts.
    pub very_early_penalty: f64,
    /// Early: blend factor at the very-early boundary.
    pub early_min_blend: f64,
    /// Middle: penalty applied in full at zero coverage.
    pub middle_max_penalty: f64,
}

impl Default for ExpertiseConfig {
    fn default() -> Self {
        Self {
            halflife_days: 7.0,
            confidence_min_attempts: 3,
            uncertain_baseline: 0.5,
            very_early_threshold: 0.1,
            early_threshold: 0.3,
            middle_threshold: 0.7,
            very_early_penalty: 0.3,
            early_min_blend: 0.5,
            middle_max_penalty: 0.3,
        }
    }
}

/// Check that a value is a finite fraction in [0.0, 1.0].
fn is_unit_fraction(value: f64) -> bool {
    value.is_finite() && (0.0..=1.0).contains(&value)
}

impl ExpertiseConfig {
    /// Check if a halflife value is valid (finite and strictly positive).
    pub fn is_valid_halflife(value: f64) -> bool {
        value.is_finite() && value > 0.0
    }

    /// Validate the whole tuning table.
    ///
    /// Coverage thresholds must be strictly increasing inside (0, 1) so the
    /// four regimes stay non-empty and ordered.
    pub fn validate(&self) -> Result<()> {
        if !Self::is_valid_halflife(self.halflife_days) {
            return Err(KalikeError::config(format!(
                "expertise.halflife_days must be > 0, got {}",
                self.halflife_days
            )));
        }
        if self.confidence_min_attempts == 0 {
            return Err(KalikeError::config(
                "expertise.confidence_min_attempts must be >= 1",
            ));
        }
        for (name, value) in [
            ("uncertain_baseline", self.uncertain_baseline),
            ("very_early_penalty", self.very_early_penalty),
            ("early_min_blend", self.early_min_blend),
            ("middle_max_penalty", self.middle_max_penalty),
        ] {
            if !is_unit_fraction(value) {
                return Err(KalikeError::config(format!(
                    "expertise.{} must be in [0.0, 1.0], got {}",
                    name, value
                )));
            }
        }
        let ordered = 0.0 < self.very_early_threshold
            && self.very_early_threshold < self.early_threshold
            && self.early_threshold < self.middle_threshold
            && self.middle_threshold < 1.0;
        if !ordered {
            return Err(KalikeError::config(format!(
                "expertise coverage thresholds must satisfy 0 < {} < {} < {} < 1",
                self.very_early_threshold, self.early_threshold, self.middle_threshold
            )));
        }
        Ok(())
    }
}

/// Stale history eviction configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EvictionConfig {
    /// Guesses older than this many days are dropped.
    pub max_age_days: u32,
    /// Also evict after every recorded guess, not just on load.
    pub evict_after_update: bool,
}

/// Minimum valid eviction window (one day).
pub const MIN_EVICTION_DAYS: u32 = 1;

impl EvictionConfig {
    /// Check if an eviction window is valid.
    pub fn is_valid_max_age_days(value: u32) -> bool {
        value >= MIN_EVICTION_DAYS
    }
}

impl Default for EvictionConfig {
    fn default() -> Self {
        Self {
            max_age_days: 30,
            evict_after_update: false,
        }
    }
}

/// Vocabulary source configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VocabularyConfig {
    /// Number of learnable words when no vocabulary file is loaded.
    pub size: u32,
    /// Optional path to a JSON word list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            size: 100,
            path: None,
        }
    }
}

impl Config {
    /// Load configuration with full precedence chain.
    pub fn load() -> Self {
        match kalike_home() {
            Some(home) => Self::load_from_home(&home),
            None => {
                let mut config = Config::default();
                config.apply_env_overrides();
                config
            }
        }
    }

    /// Load configuration rooted at a specific home directory.
    pub fn load_from_home(home: &Path) -> Self {
        let mut config = Config::default();

        let config_path = home.join("config.toml");
        if config_path.exists() {
            match Self::load_from_file(&config_path) {
                Ok(user_config) => config = config.merge(user_config),
                Err(e) => tracing::warn!("ignoring {}: {}", config_path.display(), e),
            }
        }

        config.apply_env_overrides();
        config
    }

    /// Load and validate config from a specific file path.
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|e| KalikeError::storage(path, e))?;
        let config: Config =
            toml::from_str(&content).map_err(|e| KalikeError::config(e.to_string()))?;
        config.expertise.validate()?;
        if !EvictionConfig::is_valid_max_age_days(config.eviction.max_age_days) {
            return Err(KalikeError::config(format!(
                "eviction.max_age_days must be >= {}",
                MIN_EVICTION_DAYS
            )));
        }
        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        // KALIKE_HALFLIFE_DAYS
        if let Ok(val) = env::var("KALIKE_HALFLIFE_DAYS") {
            match val.parse::<f64>() {
                Ok(n) if ExpertiseConfig::is_valid_halflife(n) => {
                    self.expertise.halflife_days = n
                }
                _ => tracing::warn!(
                    "Invalid KALIKE_HALFLIFE_DAYS value '{}'. Expected a positive number. \
                    Using '{}'.",
                    val,
                    self.expertise.halflife_days
                ),
            }
        }

        // KALIKE_EVICTION_DAYS
        if let Ok(val) = env::var("KALIKE_EVICTION_DAYS") {
            match val.parse::<u32>() {
                Ok(n) if EvictionConfig::is_valid_max_age_days(n) => {
                    self.eviction.max_age_days = n
                }
                _ => tracing::warn!(
                    "Invalid KALIKE_EVICTION_DAYS value '{}'. Must be an integer >= {}. \
                    Using '{}'.",
                    val,
                    MIN_EVICTION_DAYS,
                    self.eviction.max_age_days
                ),
            }
        }

        // KALIKE_EVICT_AFTER_UPDATE
        if let Ok(val) = env::var("KALIKE_EVICT_AFTER_UPDATE") {
            self.eviction.evict_after_update = val == "true" || val == "1";
        }

        // KALIKE_VOCABULARY_SIZE
        if let Ok(val) = env::var("KALIKE_VOCABULARY_SIZE") {
            match val.parse::<u32>() {
                Ok(n) if n > 0 => self.vocabulary.size = n,
                _ => tracing::warn!(
                    "Invalid KALIKE_VOCABULARY_SIZE value '{}'. Expected a positive integer. \
                    Using '{}'.",
                    val,
                    self.vocabulary.size
                ),
            }
        }

        // KALIKE_VOCABULARY
        if let Ok(val) = env::var("KALIKE_VOCABULARY") {
            if !val.is_empty() {
                self.vocabulary.path = Some(PathBuf::from(val));
            }
        }
    }

    /// Merge another config into this one.
    ///
    /// The `other` config takes precedence field by field: every value that
    /// differs from the default replaces the current one. A layer therefore
    /// cannot reset a value back to its default; it can only customize.
    fn merge(mut self, other: Config) -> Self {
        let default_expertise = ExpertiseConfig::default();
        macro_rules! take_if_custom {
            ($section:ident, $default:ident, $($field:ident),+) => {
                $(
                    if other.$section.$field != $default.$field {
                        self.$section.$field = other.$section.$field.clone();
                    }
                )+
            };
        }
        take_if_custom!(
            expertise,
            default_expertise,
            halflife_days,
            confidence_min_attempts,
            uncertain_baseline,
            very_early_threshold,
            early_threshold,
            middle_threshold,
            very_early_penalty,
            early_min_blend,
            middle_max_penalty
        );

        let default_eviction = EvictionConfig::default();
        take_if_custom!(eviction, default_eviction, max_age_days, evict_after_update);

        let default_vocabulary = VocabularyConfig::default();
        take_if_custom!(vocabulary, default_vocabulary, size, path);

        self
    }
}

/// Get the Kalike home directory.
///
/// Checks `KALIKE_HOME` first, then falls back to `~/.kalike`. An empty
/// `KALIKE_HOME` is ignored; a relative one is canonicalized when it exists.
pub fn kalike_home() -> Option<PathBuf> {
    if let Ok(home) = env::var("KALIKE_HOME") {
        if home.is_empty() {
            tracing::warn!("KALIKE_HOME is empty, using default");
        } else {
            let path = PathBuf::from(&home);
            if path.is_absolute() {
                return Some(path);
            }
            if let Ok(canonical) = path.canonicalize() {
                return Some(canonical);
            }
            tracing::warn!("KALIKE_HOME is relative and doesn't exist, using as-is");
            return Some(path);
        }
    }

    if let Some(home) = dirs::home_dir() {
        return Some(home.join(".kalike"));
    }

    // Containerized/minimal environments without HOME
    let fallback_path = env::temp_dir().join("kalike");
    tracing::warn!(
        "HOME not set, using fallback location: {}",
        fallback_path.display()
    );
    Some(fallback_path)
}

/// Guest stats file: `<home>/learner-stats.json`.
pub fn guest_stats_path(home: &Path) -> PathBuf {
    home.join("learner-stats.json")
}

/// Per-account document directory: `<home>/accounts/`.
pub fn accounts_dir(home: &Path) -> PathBuf {
    home.join("accounts")
}

/// Crash log: `<home>/crash.log`.
pub fn crash_log_path(home: &Path) -> PathBuf {
    home.join("crash.log")
}

//! The learner's stats and the expertise engine built on top of them.
//!
//! [`Stats`] is the persisted unit: answer counters plus one guess history
//! per vocabulary word. [`UserStats`] owns a `Stats`, keeps a cache of
//! per-word mastery scores, and answers every expertise query.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{Config, EvictionConfig, ExpertiseConfig};
use crate::stats::eviction::{evict_before, eviction_threshold, EvictionReport};
use crate::stats::levels::{level_for, LevelResult};
use crate::stats::scoring::{self, CoverageStage};
use crate::stats::GuessEvent;

/// Answer counters and per-word guess histories.
///
/// Invariants: no history is empty; `total_answers` equals the number of
/// stored guesses and `correct_answers` the number of correct ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stats {
    /// Completed games.
    pub games_played: u64,
    /// Correct answers across all stored guesses.
    pub correct_answers: u64,
    /// All stored guesses.
    pub total_answers: u64,
    /// Word -> guesses in the order they were made.
    pub word_guesses: BTreeMap<String, Vec<GuessEvent>>,
}

impl Stats {
    /// Number of guesses across all histories.
    pub fn guess_count(&self) -> u64 {
        self.word_guesses.values().map(|g| g.len() as u64).sum()
    }

    /// Number of correct guesses across all histories.
    pub fn correct_count(&self) -> u64 {
        self.word_guesses
            .values()
            .flat_map(|g| g.iter())
            .filter(|g| g.correct)
            .count() as u64
    }

    /// Drop empty histories and make the counters match the histories.
    ///
    /// Returns true if anything had to be corrected.
    pub fn reconcile(&mut self) -> bool {
        let before = self.word_guesses.len();
        self.word_guesses.retain(|_, guesses| !guesses.is_empty());
        let mut changed = self.word_guesses.len() != before;

        let total = self.guess_count();
        let correct = self.correct_count();
        if self.total_answers != total || self.correct_answers != correct {
            tracing::warn!(
                stored_total = self.total_answers,
                stored_correct = self.correct_answers,
                total,
                correct,
                "answer counters disagree with guess histories, reconciling"
            );
            self.total_answers = total;
            self.correct_answers = correct;
            changed = true;
        }
        changed
    }
}

/// Per-word accuracy row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordAccuracy {
    pub word: String,
    /// Rounded percentage of correct guesses.
    pub accuracy: u32,
    pub total_guesses: usize,
    pub correct_guesses: usize,
}

/// Per-word expertise row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordExpertise {
    pub word: String,
    /// Cached mastery score (0.0 to 1.0).
    pub expertise: f64,
    pub total_guesses: usize,
    /// Rounded percentage of correct guesses.
    pub accuracy: u32,
}

/// Count of attempted words per mastery bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpertiseDistribution {
    /// Score below 0.3.
    pub novice: usize,
    /// Score in [0.3, 0.6).
    pub learning: usize,
    /// Score in [0.6, 0.8).
    pub proficient: usize,
    /// Score of 0.8 or more.
    pub expert: usize,
}

/// Snapshot of the learner's expertise for dashboards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpertiseSummary {
    pub overall_expertise: f64,
    pub attempted_words: usize,
    pub total_vocabulary: usize,
    /// Attempted / vocabulary, uncapped.
    pub coverage_ratio: f64,
    pub coverage_stage: CoverageStage,
    pub distribution: ExpertiseDistribution,
    pub average_attempted_expertise: f64,
}

/// The expertise engine for one learner.
#[derive(Debug, Clone)]
pub struct UserStats {
    stats: Stats,
    /// Mastery per word, as of the last update or recompute.
    word_expertise: HashMap<String, f64>,
    expertise_config: ExpertiseConfig,
    eviction_config: EvictionConfig,
}

impl Default for UserStats {
    fn default() -> Self {
        Self::with_configs(ExpertiseConfig::default(), EvictionConfig::default())
    }
}

impl UserStats {
    /// Create empty stats using the expertise and eviction sections of `config`.
    pub fn new(config: &Config) -> Self {
        Self::with_configs(config.expertise.clone(), config.eviction.clone())
    }

    /// Create empty stats with explicit tuning.
    pub fn with_configs(expertise_config: ExpertiseConfig, eviction_config: EvictionConfig) -> Self {
        Self {
            stats: Stats::default(),
            word_expertise: HashMap::new(),
            expertise_config,
            eviction_config,
        }
    }

    /// Reset to a fresh learner.
    pub fn reset(&mut self) {
        self.stats = Stats::default();
        self.word_expertise.clear();
        tracing::debug!("user stats reset to initial values");
    }

    /// Replace the current stats with loaded ones.
    ///
    /// Reconciles counters, evicts stale history and recomputes every score
    /// before anything is reported. The returned report says whether the
    /// loaded data changed and should be written back.
    pub fn load(&mut self, stats: Stats, now: DateTime<Utc>) -> EvictionReport {
        self.stats = stats;
        let reconciled = self.stats.reconcile();

        let mut report = self.evict(now);
        if !report.changed {
            self.recompute_all(now);
        }
        report.changed |= reconciled;

        tracing::debug!(
            words = self.stats.word_guesses.len(),
            total_answers = self.stats.total_answers,
            "user stats loaded"
        );
        report
    }

    /// The underlying stats.
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// The expertise tuning in use.
    pub fn expertise_config(&self) -> &ExpertiseConfig {
        &self.expertise_config
    }

    /// Record an answer for `word` and return its updated mastery score.
    pub fn record_guess(&mut self, word: &str, correct: bool, now: DateTime<Utc>) -> f64 {
        self.stats
            .word_guesses
            .entry(word.to_string())
            .or_default()
            .push(GuessEvent::new(correct, now));
        self.stats.total_answers += 1;
        if correct {
            self.stats.correct_answers += 1;
        }

        if self.eviction_config.evict_after_update {
            self.evict(now);
        }
        self.update_word_expertise(word, now);

        let expertise = self.word_expertise(word);
        tracing::debug!(word, correct, expertise, "stats updated");
        expertise
    }

    /// Record that the learner asked to see the answer. Counts as incorrect.
    pub fn record_reveal(&mut self, word: &str, now: DateTime<Utc>) -> f64 {
        self.record_guess(word, false, now)
    }

    /// Count one completed game.
    pub fn record_game_played(&mut self) {
        self.stats.games_played += 1;
    }

    /// Drop guesses older than the eviction window.
    ///
    /// Counters are reduced by what was removed. Scores are recomputed when
    /// anything changed.
    pub fn evict(&mut self, now: DateTime<Utc>) -> EvictionReport {
        let threshold = eviction_threshold(now, self.eviction_config.max_age_days);
        let report = evict_before(&mut self.stats.word_guesses, threshold);

        if report.changed {
            self.stats.total_answers = self.stats.total_answers.saturating_sub(report.removed_count);
            self.stats.correct_answers =
                self.stats.correct_answers.saturating_sub(report.removed_correct);
            tracing::info!(
                removed = report.removed_count,
                words_deleted = report.keys_deleted,
                "evicted stale guesses"
            );
            self.recompute_all(now);
        }

        report
    }

    /// Recompute and cache the mastery score of every attempted word.
    pub fn recompute_all(&mut self, now: DateTime<Utc>) {
        let config = &self.expertise_config;
        self.word_expertise = self
            .stats
            .word_guesses
            .iter()
            .map(|(word, guesses)| (word.clone(), scoring::word_expertise(guesses, config, now)))
            .collect();
        tracing::debug!(words = self.word_expertise.len(), "recomputed expertise");
    }

    fn update_word_expertise(&mut self, word: &str, now: DateTime<Utc>) {
        match self.stats.word_guesses.get(word) {
            Some(guesses) if !guesses.is_empty() => {
                let score = scoring::word_expertise(guesses, &self.expertise_config, now);
                self.word_expertise.insert(word.to_string(), score);
            }
            _ => {
                self.word_expertise.remove(word);
            }
        }
    }

    /// Mastery score of `word` computed fresh at `now`.
    pub fn score_for(&self, word: &str, now: DateTime<Utc>) -> f64 {
        scoring::word_expertise(self.word_guess_history(word), &self.expertise_config, now)
    }

    /// Cached mastery score of `word`; 0.0 when never attempted.
    pub fn word_expertise(&self, word: &str) -> f64 {
        self.word_expertise.get(word).copied().unwrap_or(0.0)
    }

    fn attempted_scores(&self) -> Vec<f64> {
        self.stats
            .word_guesses
            .keys()
            .map(|word| self.word_expertise(word))
            .collect()
    }

    /// Coverage-adjusted overall expertise (0.0 to 1.0).
    pub fn overall_expertise(&self, vocabulary_size: usize) -> f64 {
        scoring::overall_expertise(
            &self.attempted_scores(),
            vocabulary_size,
            &self.expertise_config,
        )
    }

    /// Current tier on the level ladder.
    pub fn expertise_level(&self, vocabulary_size: usize) -> LevelResult {
        level_for(self.overall_expertise(vocabulary_size))
    }

    /// Detailed expertise snapshot.
    pub fn expertise_summary(&self, vocabulary_size: usize) -> ExpertiseSummary {
        let scores = self.attempted_scores();

        let mut distribution = ExpertiseDistribution::default();
        for &score in &scores {
            if score < 0.3 {
                distribution.novice += 1;
            } else if score < 0.6 {
                distribution.learning += 1;
            } else if score < 0.8 {
                distribution.proficient += 1;
            } else {
                distribution.expert += 1;
            }
        }

        let coverage_ratio = if vocabulary_size > 0 {
            scores.len() as f64 / vocabulary_size as f64
        } else {
            0.0
        };
        let average_attempted_expertise = if scores.is_empty() {
            0.0
        } else {
            scores.iter().sum::<f64>() / scores.len() as f64
        };

        ExpertiseSummary {
            overall_expertise: self.overall_expertise(vocabulary_size),
            attempted_words: scores.len(),
            total_vocabulary: vocabulary_size,
            coverage_ratio,
            coverage_stage: CoverageStage::for_coverage(
                scoring::coverage_ratio(scores.len(), vocabulary_size),
                &self.expertise_config,
            ),
            distribution,
            average_attempted_expertise,
        }
    }

    /// Lifetime accuracy as a rounded percentage.
    pub fn accuracy(&self) -> u32 {
        percentage(
            self.stats.correct_answers as usize,
            self.stats.total_answers as usize,
        )
    }

    /// Guesses recorded for `word`, oldest first.
    pub fn word_guess_history(&self, word: &str) -> &[GuessEvent] {
        self.stats
            .word_guesses
            .get(word)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Accuracy of `word` as a rounded percentage; 0 when never attempted.
    pub fn word_accuracy(&self, word: &str) -> u32 {
        percentage(
            self.correct_guesses_for_word(word),
            self.total_guesses_for_word(word),
        )
    }

    pub fn total_guesses_for_word(&self, word: &str) -> usize {
        self.word_guess_history(word).len()
    }

    pub fn correct_guesses_for_word(&self, word: &str) -> usize {
        self.word_guess_history(word)
            .iter()
            .filter(|g| g.correct)
            .count()
    }

    /// The last `limit` guesses for `word`.
    pub fn recent_guesses_for_word(&self, word: &str, limit: usize) -> &[GuessEvent] {
        let guesses = self.word_guess_history(word);
        &guesses[guesses.len().saturating_sub(limit)..]
    }

    /// Every word with at least one stored guess.
    pub fn words_with_guesses(&self) -> Vec<&str> {
        self.stats.word_guesses.keys().map(String::as_str).collect()
    }

    /// Words answered correctly at least `min_correct` times.
    pub fn words_learned(&self, min_correct: usize) -> Vec<&str> {
        self.words_with_guesses()
            .into_iter()
            .filter(|word| self.correct_guesses_for_word(word) >= min_correct)
            .collect()
    }

    /// Words with at least `min_guesses` attempts and accuracy below the threshold.
    pub fn words_needing_practice(&self, accuracy_threshold: u32, min_guesses: usize) -> Vec<&str> {
        self.words_with_guesses()
            .into_iter()
            .filter(|word| {
                self.total_guesses_for_word(word) >= min_guesses
                    && self.word_accuracy(word) < accuracy_threshold
            })
            .collect()
    }

    /// Attempted words, least accurate first.
    pub fn words_by_accuracy(&self) -> Vec<WordAccuracy> {
        let mut rows: Vec<WordAccuracy> = self
            .words_with_guesses()
            .into_iter()
            .map(|word| WordAccuracy {
                word: word.to_string(),
                accuracy: self.word_accuracy(word),
                total_guesses: self.total_guesses_for_word(word),
                correct_guesses: self.correct_guesses_for_word(word),
            })
            .collect();
        rows.sort_by_key(|row| row.accuracy);
        rows
    }

    /// Attempted words, lowest mastery first (most in need of practice).
    pub fn words_by_expertise(&self) -> Vec<WordExpertise> {
        let mut rows: Vec<WordExpertise> = self
            .words_with_guesses()
            .into_iter()
            .map(|word| WordExpertise {
                word: word.to_string(),
                expertise: self.word_expertise(word),
                total_guesses: self.total_guesses_for_word(word),
                accuracy: self.word_accuracy(word),
            })
            .collect();
        rows.sort_by(|a, b| {
            a.expertise
                .partial_cmp(&b.expertise)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        rows
    }
}

/// Rounded percentage of `part` over `whole`; 0 when `whole` is 0.
fn percentage(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    (part as f64 / whole as f64 * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 10, 8, 30, 0).unwrap()
    }

    fn engine() -> UserStats {
        UserStats::default()
    }

    fn stats_with(entries: Vec<(&str, Vec<GuessEvent>)>) -> Stats {
        let word_guesses: BTreeMap<String, Vec<GuessEvent>> = entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        let mut stats = Stats {
            word_guesses,
            ..Stats::default()
        };
        stats.total_answers = stats.guess_count();
        stats.correct_answers = stats.correct_count();
        stats
    }

    #[test]
    fn test_record_guess_updates_counters_and_history() {
        let mut us = engine();
        us.record_guess("water", true, now());
        us.record_guess("water", false, now());
        us.record_guess("fire", true, now());

        let stats = us.stats();
        assert_eq!(stats.total_answers, 3);
        assert_eq!(stats.correct_answers, 2);
        assert_eq!(stats.guess_count(), 3);
        assert_eq!(us.word_guess_history("water").len(), 2);
        assert!(us.word_guess_history("water")[0].correct);
        assert!(!us.word_guess_history("water")[1].correct);
    }

    #[test]
    fn test_record_guess_returns_new_score() {
        let mut us = engine();
        let score = us.record_guess("water", true, now());
        assert!((score - 2.0 / 3.0).abs() < 1e-12);
        assert!((us.word_expertise("water") - score).abs() < 1e-12);
    }

    #[test]
    fn test_record_reveal_counts_as_incorrect() {
        let mut us = engine();
        us.record_reveal("tree", now());
        assert_eq!(us.stats().total_answers, 1);
        assert_eq!(us.stats().correct_answers, 0);
        assert!(!us.word_guess_history("tree")[0].correct);
    }

    #[test]
    fn test_record_game_played() {
        let mut us = engine();
        us.record_game_played();
        us.record_game_played();
        assert_eq!(us.stats().games_played, 2);
    }

    #[test]
    fn test_unknown_word_defaults() {
        let us = engine();
        assert_eq!(us.word_expertise("nothing"), 0.0);
        assert_eq!(us.score_for("nothing", now()), 0.0);
        assert_eq!(us.word_accuracy("nothing"), 0);
        assert!(us.word_guess_history("nothing").is_empty());
        assert_eq!(us.accuracy(), 0);
    }

    #[test]
    fn test_score_for_reflects_passage_of_time() {
        let mut us = engine();
        us.record_guess("sun", true, now() - Duration::days(7));
        us.record_guess("sun", false, now());
        us.record_guess("sun", false, now());

        let cached = us.word_expertise("sun");
        let later = us.score_for("sun", now() + Duration::days(7));
        // Relative weights are unchanged by uniform aging
        assert!((cached - later).abs() < 1e-9);

        let w = (-1.0f64).exp();
        assert!((cached - w / (w + 2.0)).abs() < 1e-9);
    }

    #[test]
    fn test_overall_expertise_empty() {
        assert_eq!(engine().overall_expertise(100), 0.0);
        let level = engine().expertise_level(100);
        assert_eq!(level.name, "Earthworm");
    }

    #[test]
    fn test_overall_expertise_very_early() {
        let mut us = engine();
        for word in ["a", "b", "c", "d", "e"] {
            for _ in 0..3 {
                us.record_guess(word, true, now());
            }
        }
        assert!((us.overall_expertise(100) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_expertise_level_full_mastery() {
        let mut us = engine();
        for i in 0..10 {
            let word = format!("word-{}", i);
            for _ in 0..3 {
                us.record_guess(&word, true, now());
            }
        }
        let level = us.expertise_level(10);
        assert_eq!(level.level, 9);
        assert!(level.is_max_level);
    }

    #[test]
    fn test_evict_removes_stale_word_from_attempted() {
        let mut us = engine();
        us.load(
            stats_with(vec![(
                "old",
                vec![GuessEvent::correct_at(now() - Duration::days(10))],
            )]),
            now(),
        );
        assert_eq!(us.words_with_guesses(), vec!["old"]);

        let report = us.evict(now() + Duration::days(21));
        assert!(report.changed);
        assert_eq!(report.keys_deleted, 1);
        assert!(us.words_with_guesses().is_empty());
        assert_eq!(us.word_expertise("old"), 0.0);
        assert_eq!(us.overall_expertise(100), 0.0);
    }

    #[test]
    fn test_evict_keeps_counters_consistent() {
        let mut us = engine();
        us.record_guess("x", true, now() - Duration::days(40));
        us.record_guess("x", false, now());
        us.record_guess("y", true, now() - Duration::days(35));

        let report = us.evict(now());
        assert_eq!(report.removed_count, 2);
        assert_eq!(report.removed_correct, 2);
        assert_eq!(us.stats().total_answers, 1);
        assert_eq!(us.stats().correct_answers, 0);
        assert_eq!(us.stats().total_answers, us.stats().guess_count());
    }

    #[test]
    fn test_evict_rescores_with_recent_guesses_only() {
        let mut us = engine();
        us.load(
            stats_with(vec![(
                "tree",
                vec![
                    GuessEvent::correct_at(now() - Duration::days(45)),
                    GuessEvent::correct_at(now() - Duration::days(44)),
                    GuessEvent::incorrect_at(now()),
                ],
            )]),
            now(),
        );

        // Only the recent incorrect guess survives the load-time eviction
        assert_eq!(us.total_guesses_for_word("tree"), 1);
        assert!((us.word_expertise("tree") - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_evict_after_update_when_enabled() {
        let mut us = UserStats::with_configs(
            ExpertiseConfig::default(),
            EvictionConfig {
                max_age_days: 30,
                evict_after_update: true,
            },
        );
        us.record_guess("old", true, now() - Duration::days(60));
        us.record_guess("new", true, now());

        assert_eq!(us.words_with_guesses(), vec!["new"]);
        assert_eq!(us.stats().total_answers, 1);
    }

    #[test]
    fn test_load_reports_unchanged_for_clean_data() {
        let mut us = engine();
        let report = us.load(
            stats_with(vec![("fresh", vec![GuessEvent::correct_at(now())])]),
            now(),
        );
        assert!(!report.changed);
        assert!((us.word_expertise("fresh") - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_load_reconciles_counters() {
        let mut stats = stats_with(vec![("fresh", vec![GuessEvent::correct_at(now())])]);
        stats.total_answers = 42;
        stats.correct_answers = 40;

        let mut us = engine();
        let report = us.load(stats, now());
        assert!(report.changed);
        assert_eq!(us.stats().total_answers, 1);
        assert_eq!(us.stats().correct_answers, 1);
    }

    #[test]
    fn test_load_drops_empty_histories() {
        let mut us = engine();
        let mut stats = stats_with(vec![("fresh", vec![GuessEvent::correct_at(now())])]);
        stats.word_guesses.insert("empty".to_string(), Vec::new());

        let report = us.load(stats, now());
        assert!(report.changed);
        assert_eq!(us.words_with_guesses(), vec!["fresh"]);
    }

    #[test]
    fn test_reset() {
        let mut us = engine();
        us.record_guess("a", true, now());
        us.record_game_played();
        us.reset();
        assert_eq!(us.stats(), &Stats::default());
        assert_eq!(us.word_expertise("a"), 0.0);
    }

    #[test]
    fn test_accuracy_queries() {
        let mut us = engine();
        us.record_guess("a", true, now());
        us.record_guess("a", true, now());
        us.record_guess("a", false, now());
        us.record_guess("b", false, now());

        assert_eq!(us.accuracy(), 50);
        assert_eq!(us.word_accuracy("a"), 67);
        assert_eq!(us.word_accuracy("b"), 0);
        assert_eq!(us.correct_guesses_for_word("a"), 2);
        assert_eq!(us.total_guesses_for_word("a"), 3);
    }

    #[test]
    fn test_recent_guesses_for_word() {
        let mut us = engine();
        for i in 0..7 {
            us.record_guess("a", i % 2 == 0, now() - Duration::minutes(10 - i));
        }
        let recent = us.recent_guesses_for_word("a", 5);
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[4], us.word_guess_history("a")[6]);
        assert_eq!(us.recent_guesses_for_word("a", 50).len(), 7);
    }

    #[test]
    fn test_words_learned_and_needing_practice() {
        let mut us = engine();
        for _ in 0..3 {
            us.record_guess("hard", false, now());
        }
        us.record_guess("easy", true, now());
        us.record_guess("new", false, now());

        assert_eq!(us.words_learned(1), vec!["easy"]);
        assert_eq!(us.words_needing_practice(70, 3), vec!["hard"]);
    }

    #[test]
    fn test_words_by_accuracy_ascending() {
        let mut us = engine();
        us.record_guess("good", true, now());
        us.record_guess("bad", false, now());
        us.record_guess("mixed", true, now());
        us.record_guess("mixed", false, now());

        let rows = us.words_by_accuracy();
        let order: Vec<&str> = rows.iter().map(|r| r.word.as_str()).collect();
        assert_eq!(order, vec!["bad", "mixed", "good"]);
        assert_eq!(rows[1].accuracy, 50);
    }

    #[test]
    fn test_words_by_expertise_ascending() {
        let mut us = engine();
        for _ in 0..3 {
            us.record_guess("strong", true, now());
            us.record_guess("weak", false, now());
        }
        us.record_guess("unsure", true, now());

        let rows = us.words_by_expertise();
        let order: Vec<&str> = rows.iter().map(|r| r.word.as_str()).collect();
        assert_eq!(order, vec!["weak", "unsure", "strong"]);
    }

    #[test]
    fn test_expertise_summary() {
        let mut us = engine();
        for _ in 0..3 {
            us.record_guess("strong", true, now());
            us.record_guess("weak", false, now());
        }
        us.record_guess("unsure", true, now());

        let summary = us.expertise_summary(20);
        assert_eq!(summary.attempted_words, 3);
        assert_eq!(summary.total_vocabulary, 20);
        assert!((summary.coverage_ratio - 0.15).abs() < 1e-12);
        assert_eq!(summary.coverage_stage, CoverageStage::Early);
        assert_eq!(summary.distribution.novice, 1);
        assert_eq!(summary.distribution.proficient, 1);
        assert_eq!(summary.distribution.expert, 1);
        assert!((summary.average_attempted_expertise - (1.0 + 2.0 / 3.0) / 3.0).abs() < 1e-12);
        assert!((summary.overall_expertise - us.overall_expertise(20)).abs() < 1e-12);
    }
}

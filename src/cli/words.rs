//! Words command for Kalike.
//!
//! Lists attempted words with their mastery, accuracy and recent answers,
//! weakest first. `--practice` narrows the list to words that keep being
//! missed.

use serde::{Deserialize, Serialize};

use crate::cli::{format_score, history_marks};
use crate::core::LearnerSession;
use crate::storage::StatsStore;
use crate::vocabulary::Vocabulary;

/// How many recent answers to show per word.
pub const RECENT_GUESSES: usize = 5;

/// Sort order for the word list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordSort {
    /// Lowest mastery first.
    #[default]
    Expertise,
    /// Lowest accuracy first.
    Accuracy,
}

/// Options for the words command.
#[derive(Debug, Clone)]
pub struct WordsOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    pub sort: WordSort,
    /// Only words needing practice.
    pub practice: bool,
    /// Accuracy percentage below which a word needs practice.
    pub practice_threshold: u32,
    /// Minimum attempts before a word can need practice.
    pub practice_min_guesses: usize,
    /// Maximum rows to show.
    pub limit: Option<usize>,
}

impl Default for WordsOptions {
    fn default() -> Self {
        Self {
            json: false,
            quiet: false,
            sort: WordSort::default(),
            practice: false,
            practice_threshold: 70,
            practice_min_guesses: 3,
            limit: None,
        }
    }
}

/// One word in the listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordInfo {
    pub word: String,
    /// Cached mastery (0.0 to 1.0).
    pub expertise: f64,
    /// Accuracy percentage.
    pub accuracy: u32,
    pub total_guesses: usize,
    pub correct_guesses: usize,
    /// Recent answers, oldest first: `+` correct, `-` wrong.
    pub recent: String,
}

/// Output format for the words command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordsOutput {
    pub success: bool,
    pub words: Vec<WordInfo>,
    /// Words learned (at least one correct answer).
    pub learned: usize,
    /// Vocabulary words never attempted, when a vocabulary is loaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unattempted: Option<Vec<String>>,
}

/// The words command implementation.
pub struct WordsCommand<'a, S: StatsStore> {
    session: &'a LearnerSession<S>,
    vocabulary: Option<&'a Vocabulary>,
}

impl<'a, S: StatsStore> WordsCommand<'a, S> {
    /// Create a new words command.
    pub fn new(session: &'a LearnerSession<S>, vocabulary: Option<&'a Vocabulary>) -> Self {
        Self {
            session,
            vocabulary,
        }
    }

    /// Run the words command.
    pub fn run(&self, options: &WordsOptions) -> WordsOutput {
        let stats = self.session.stats();

        let ordered: Vec<String> = match options.sort {
            WordSort::Expertise => stats
                .words_by_expertise()
                .into_iter()
                .map(|row| row.word)
                .collect(),
            WordSort::Accuracy => stats
                .words_by_accuracy()
                .into_iter()
                .map(|row| row.word)
                .collect(),
        };

        let practice: Vec<&str> = if options.practice {
            stats.words_needing_practice(options.practice_threshold, options.practice_min_guesses)
        } else {
            Vec::new()
        };

        let mut words: Vec<WordInfo> = ordered
            .into_iter()
            .filter(|word| !options.practice || practice.contains(&word.as_str()))
            .map(|word| WordInfo {
                expertise: stats.word_expertise(&word),
                accuracy: stats.word_accuracy(&word),
                total_guesses: stats.total_guesses_for_word(&word),
                correct_guesses: stats.correct_guesses_for_word(&word),
                recent: history_marks(stats.recent_guesses_for_word(&word, RECENT_GUESSES)),
                word,
            })
            .collect();

        if let Some(limit) = options.limit {
            words.truncate(limit);
        }

        WordsOutput {
            success: true,
            words,
            learned: stats.words_learned(1).len(),
            unattempted: self.vocabulary.map(|v| {
                v.unattempted(stats)
                    .into_iter()
                    .map(|entry| entry.english.clone())
                    .collect()
            }),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &WordsOutput, options: &WordsOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            Self::format_human_readable(output, options)
        }
    }

    fn format_human_readable(output: &WordsOutput, options: &WordsOptions) -> String {
        if output.words.is_empty() {
            return if options.practice {
                "No words need practice.".to_string()
            } else {
                "No words attempted yet.".to_string()
            };
        }

        let width = output
            .words
            .iter()
            .map(|w| w.word.chars().count())
            .max()
            .unwrap_or(4)
            .max(4);

        let mut lines = Vec::new();
        lines.push(format!(
            "{:<width$}  {:>7}  {:>8}  {:>7}  Recent",
            "Word",
            "Mastery",
            "Accuracy",
            "Guesses",
            width = width
        ));
        for info in &output.words {
            lines.push(format!(
                "{:<width$}  {:>7}  {:>7}%  {:>7}  {}",
                info.word,
                format_score(info.expertise),
                info.accuracy,
                info.total_guesses,
                info.recent,
                width = width
            ));
        }

        lines.push(String::new());
        lines.push(format!("Words learned: {}", output.learned));
        if let Some(unattempted) = &output.unattempted {
            lines.push(format!("Not yet attempted: {}", unattempted.len()));
        }

        lines.join("\n")
    }
}

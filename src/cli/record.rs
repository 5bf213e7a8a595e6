//! Record command for Kalike.
//!
//! Feeds answers into the learner's stats: a graded guess, a revealed answer,
//! a typed answer checked against the vocabulary, or a finished game.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cli::format_score;
use crate::core::LearnerSession;
use crate::stats::LevelResult;
use crate::storage::StatsStore;
use crate::vocabulary::Vocabulary;

/// Options for the record command.
#[derive(Debug, Clone, Default)]
pub struct RecordOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// What to record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum RecordInput {
    /// An already graded answer.
    Guess { word: String, correct: bool },
    /// The learner gave up and asked for the answer.
    Reveal { word: String },
    /// A typed answer to grade against the vocabulary.
    Check { word: String, answer: String },
    /// A game was completed.
    Game,
}

impl RecordInput {
    fn action(&self) -> &'static str {
        match self {
            RecordInput::Guess { .. } => "guess",
            RecordInput::Reveal { .. } => "reveal",
            RecordInput::Check { .. } => "check",
            RecordInput::Game => "game",
        }
    }
}

/// Output format for the record command.
#[derive(Debug, Clone, Serialize)]
pub struct RecordOutput {
    /// Whether the answer was recorded.
    pub success: bool,
    /// The action performed.
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word: Option<String>,
    /// Whether the answer counted as correct.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct: Option<bool>,
    /// The expected answer, when the vocabulary knows it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    /// The word's mastery after this answer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_expertise: Option<f64>,
    /// Games played so far.
    pub games_played: u64,
    /// Level after this answer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<LevelResult>,
    /// Error message if recording failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RecordOutput {
    /// Create a failed output.
    pub fn failure(action: &str, error: impl Into<String>) -> Self {
        Self {
            success: false,
            action: action.to_string(),
            word: None,
            correct: None,
            expected: None,
            word_expertise: None,
            games_played: 0,
            level: None,
            error: Some(error.into()),
        }
    }
}

/// The record command implementation.
pub struct RecordCommand<S: StatsStore> {
    session: LearnerSession<S>,
    vocabulary: Option<Vocabulary>,
    vocabulary_size: usize,
    now: DateTime<Utc>,
}

impl<S: StatsStore> RecordCommand<S> {
    /// Create a new record command.
    pub fn new(
        session: LearnerSession<S>,
        vocabulary: Option<Vocabulary>,
        vocabulary_size: usize,
    ) -> Self {
        Self {
            session,
            vocabulary,
            vocabulary_size,
            now: Utc::now(),
        }
    }

    /// Record at a fixed instant instead of the current time.
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// The session answers are recorded into.
    pub fn session(&self) -> &LearnerSession<S> {
        &self.session
    }

    /// Run the record command.
    pub fn run(&mut self, input: &RecordInput) -> RecordOutput {
        let action = input.action();

        match input {
            RecordInput::Game => match self.session.finish_game(self.now) {
                Ok(()) => self.output(action, None, None, None, None),
                Err(e) => RecordOutput::failure(action, e.to_string()),
            },
            RecordInput::Guess { word, correct } => {
                if let Err(message) = self.require_known(word) {
                    return RecordOutput::failure(action, message);
                }
                let expected = self.expected_for(word);
                match self.session.record_guess(word, *correct, self.now) {
                    Ok(expertise) => {
                        self.output(action, Some(word.as_str()), Some(*correct), expected, Some(expertise))
                    }
                    Err(e) => RecordOutput::failure(action, e.to_string()),
                }
            }
            RecordInput::Reveal { word } => {
                if let Err(message) = self.require_known(word) {
                    return RecordOutput::failure(action, message);
                }
                let expected = self.expected_for(word);
                match self.session.reveal_answer(word, self.now) {
                    Ok(expertise) => {
                        self.output(action, Some(word.as_str()), Some(false), expected, Some(expertise))
                    }
                    Err(e) => RecordOutput::failure(action, e.to_string()),
                }
            }
            RecordInput::Check { word, answer } => {
                let Some(vocabulary) = &self.vocabulary else {
                    return RecordOutput::failure(
                        action,
                        "checking answers needs a vocabulary (--vocabulary or vocabulary.path)",
                    );
                };
                let check = match vocabulary.check_answer(word, answer) {
                    Ok(check) => check,
                    Err(e) => return RecordOutput::failure(action, e.to_string()),
                };
                match self.session.record_guess(word, check.correct, self.now) {
                    Ok(expertise) => self.output(
                        action,
                        Some(word.as_str()),
                        Some(check.correct),
                        Some(check.expected),
                        Some(expertise),
                    ),
                    Err(e) => RecordOutput::failure(action, e.to_string()),
                }
            }
        }
    }

    fn require_known(&self, word: &str) -> std::result::Result<(), String> {
        if word.trim().is_empty() {
            return Err("word must not be empty".to_string());
        }
        match &self.vocabulary {
            Some(vocabulary) if !vocabulary.contains(word) => {
                Err(format!("'{}' is not in the vocabulary", word))
            }
            _ => Ok(()),
        }
    }

    fn expected_for(&self, word: &str) -> Option<String> {
        self.vocabulary
            .as_ref()
            .and_then(|v| v.get(word))
            .map(|entry| entry.kannada.trim().to_string())
    }

    fn output(
        &self,
        action: &str,
        word: Option<&str>,
        correct: Option<bool>,
        expected: Option<String>,
        word_expertise: Option<f64>,
    ) -> RecordOutput {
        RecordOutput {
            success: true,
            action: action.to_string(),
            word: word.map(str::to_string),
            correct,
            expected,
            word_expertise,
            games_played: self.session.stats().stats().games_played,
            level: Some(self.session.level(self.vocabulary_size)),
            error: None,
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &RecordOutput, options: &RecordOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            Self::format_human_readable(output)
        }
    }

    fn format_human_readable(output: &RecordOutput) -> String {
        if !output.success {
            return format!(
                "Record failed: {}",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        let mut lines = Vec::new();

        match (output.action.as_str(), &output.word) {
            ("game", _) => lines.push(format!("Game recorded ({} played)", output.games_played)),
            ("reveal", Some(word)) => match &output.expected {
                Some(expected) => lines.push(format!("The answer for '{}' is: {}", word, expected)),
                None => lines.push(format!("Answer for '{}' revealed", word)),
            },
            (_, Some(word)) => {
                if output.correct == Some(true) {
                    lines.push(format!("Correct! '{}'", word));
                } else {
                    match &output.expected {
                        Some(expected) => lines.push(format!(
                            "Incorrect. The correct answer for '{}' is: {}",
                            word, expected
                        )),
                        None => lines.push(format!("Incorrect: '{}'", word)),
                    }
                }
            }
            _ => {}
        }

        if let Some(expertise) = output.word_expertise {
            lines.push(format!("  Word mastery: {}", format_score(expertise)));
        }
        if let Some(level) = &output.level {
            lines.push(format!("  Level: {}", level.describe()));
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::core::Principal;
    use crate::storage::{MemoryStatsStore, StatsKey};
    use crate::vocabulary::VocabularyEntry;
    use chrono::TimeZone;
    use std::sync::Arc;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 9, 1, 10, 0, 0).unwrap()
    }

    fn vocabulary() -> Vocabulary {
        Vocabulary::from_entries(vec![
            VocabularyEntry::new("water", "ನೀರು"),
            VocabularyEntry::new("tree", "ಮರ"),
        ])
    }

    fn command(
        store: &Arc<MemoryStatsStore>,
        vocabulary: Option<Vocabulary>,
    ) -> RecordCommand<Arc<MemoryStatsStore>> {
        let session =
            LearnerSession::open(Arc::clone(store), Principal::Guest, &Config::default(), now())
                .unwrap();
        RecordCommand::new(session, vocabulary, 2).at(now())
    }

    #[test]
    fn test_record_guess() {
        let store = Arc::new(MemoryStatsStore::new());
        let mut cmd = command(&store, None);

        let output = cmd.run(&RecordInput::Guess {
            word: "water".into(),
            correct: true,
        });

        assert!(output.success);
        assert_eq!(output.correct, Some(true));
        assert!((output.word_expertise.unwrap() - 2.0 / 3.0).abs() < 1e-12);
        let stats = store.load(&StatsKey::Guest).unwrap().unwrap().into_stats();
        assert_eq!(stats.total_answers, 1);
    }

    #[test]
    fn test_record_rejects_unknown_word_with_vocabulary() {
        let store = Arc::new(MemoryStatsStore::new());
        let mut cmd = command(&store, Some(vocabulary()));

        let output = cmd.run(&RecordInput::Guess {
            word: "sky".into(),
            correct: true,
        });

        assert!(!output.success);
        assert!(output.error.unwrap().contains("not in the vocabulary"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_record_rejects_empty_word() {
        let store = Arc::new(MemoryStatsStore::new());
        let mut cmd = command(&store, None);
        let output = cmd.run(&RecordInput::Reveal { word: "  ".into() });
        assert!(!output.success);
    }

    #[test]
    fn test_reveal_is_incorrect_and_shows_answer() {
        let store = Arc::new(MemoryStatsStore::new());
        let mut cmd = command(&store, Some(vocabulary()));

        let output = cmd.run(&RecordInput::Reveal {
            word: "tree".into(),
        });

        assert!(output.success);
        assert_eq!(output.correct, Some(false));
        assert_eq!(output.expected.as_deref(), Some("ಮರ"));
        assert_eq!(cmd.session().stats().stats().correct_answers, 0);

        let text = cmd.format_output(&output, &RecordOptions::default());
        assert!(text.contains("The answer for 'tree' is: ಮರ"));
    }

    #[test]
    fn test_check_grades_typed_answer() {
        let store = Arc::new(MemoryStatsStore::new());
        let mut cmd = command(&store, Some(vocabulary()));

        let right = cmd.run(&RecordInput::Check {
            word: "water".into(),
            answer: " ನೀರು ".into(),
        });
        assert_eq!(right.correct, Some(true));

        let wrong = cmd.run(&RecordInput::Check {
            word: "water".into(),
            answer: "ಮರ".into(),
        });
        assert_eq!(wrong.correct, Some(false));
        assert_eq!(cmd.session().stats().total_guesses_for_word("water"), 2);

        let text = cmd.format_output(&wrong, &RecordOptions::default());
        assert!(text.contains("Incorrect. The correct answer for 'water' is: ನೀರು"));
    }

    #[test]
    fn test_check_without_vocabulary_fails() {
        let store = Arc::new(MemoryStatsStore::new());
        let mut cmd = command(&store, None);
        let output = cmd.run(&RecordInput::Check {
            word: "water".into(),
            answer: "x".into(),
        });
        assert!(!output.success);
        assert!(store.is_empty());
    }

    #[test]
    fn test_game() {
        let store = Arc::new(MemoryStatsStore::new());
        let mut cmd = command(&store, None);

        cmd.run(&RecordInput::Game);
        let output = cmd.run(&RecordInput::Game);

        assert!(output.success);
        assert_eq!(output.games_played, 2);
        let text = cmd.format_output(&output, &RecordOptions::default());
        assert_eq!(text, "Game recorded (2 played)\n  Level: Earthworm (0% to Blind Snake)");
    }

    #[test]
    fn test_format_output_json_and_quiet() {
        let store = Arc::new(MemoryStatsStore::new());
        let mut cmd = command(&store, None);
        let output = cmd.run(&RecordInput::Guess {
            word: "water".into(),
            correct: false,
        });

        let json = cmd.format_output(
            &output,
            &RecordOptions {
                json: true,
                quiet: false,
            },
        );
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["action"], "guess");
        assert_eq!(parsed["correct"], false);
        assert_eq!(parsed["level"]["name"], "Rat Snake");
        assert!(parsed.get("error").is_none());

        let quiet = cmd.format_output(
            &output,
            &RecordOptions {
                json: false,
                quiet: true,
            },
        );
        assert!(quiet.is_empty());
    }

    #[test]
    fn test_record_input_serde() {
        let input: RecordInput =
            serde_json::from_str(r#"{"action": "guess", "word": "sun", "correct": true}"#).unwrap();
        assert_eq!(
            input,
            RecordInput::Guess {
                word: "sun".into(),
                correct: true
            }
        );
    }
}

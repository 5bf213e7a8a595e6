//! The learnable word list.
//!
//! A vocabulary file is a JSON array of `{"english": ..., "kannada": ...}`
//! entries. Stats are keyed by the English gloss; the learner types the
//! Kannada word.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{KalikeError, Result};
use crate::stats::UserStats;

/// One vocabulary item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    /// Prompt shown to the learner, and the stats key.
    pub english: String,
    /// Expected answer.
    pub kannada: String,
}

impl VocabularyEntry {
    pub fn new(english: impl Into<String>, kannada: impl Into<String>) -> Self {
        Self {
            english: english.into(),
            kannada: kannada.into(),
        }
    }

    /// Whether `answer` matches, ignoring surrounding whitespace.
    pub fn is_correct(&self, answer: &str) -> bool {
        answer.trim() == self.kannada.trim()
    }
}

/// Result of checking a typed answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerCheck {
    pub english: String,
    pub correct: bool,
    /// The expected answer, trimmed.
    pub expected: String,
}

/// An ordered word list with lookup by English gloss.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    entries: Vec<VocabularyEntry>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    /// Build from entries. Later duplicates of an English gloss are dropped.
    pub fn from_entries(entries: Vec<VocabularyEntry>) -> Self {
        let mut vocabulary = Self::default();
        for entry in entries {
            if vocabulary.index.contains_key(&entry.english) {
                tracing::warn!(english = %entry.english, "duplicate vocabulary entry ignored");
                continue;
            }
            vocabulary
                .index
                .insert(entry.english.clone(), vocabulary.entries.len());
            vocabulary.entries.push(entry);
        }
        vocabulary
    }

    /// Load a vocabulary JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| KalikeError::storage(path, e))?;
        let entries: Vec<VocabularyEntry> = serde_json::from_str(&content).map_err(|e| {
            KalikeError::vocabulary(format!("invalid vocabulary {}: {}", path.display(), e))
        })?;
        Ok(Self::from_entries(entries))
    }

    /// Parse vocabulary JSON text.
    pub fn from_json(content: &str) -> Result<Self> {
        let entries: Vec<VocabularyEntry> = serde_json::from_str(content)
            .map_err(|e| KalikeError::vocabulary(format!("invalid vocabulary: {}", e)))?;
        Ok(Self::from_entries(entries))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[VocabularyEntry] {
        &self.entries
    }

    pub fn get(&self, english: &str) -> Option<&VocabularyEntry> {
        self.index.get(english).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, english: &str) -> bool {
        self.index.contains_key(english)
    }

    /// Check a typed answer for the word with the given English gloss.
    pub fn check_answer(&self, english: &str, answer: &str) -> Result<AnswerCheck> {
        let entry = self.get(english).ok_or_else(|| {
            KalikeError::vocabulary(format!("'{}' is not in the vocabulary", english))
        })?;
        Ok(AnswerCheck {
            english: entry.english.clone(),
            correct: entry.is_correct(answer),
            expected: entry.kannada.trim().to_string(),
        })
    }

    /// Entries the learner has no stored guesses for, in vocabulary order.
    pub fn unattempted<'a>(&'a self, stats: &UserStats) -> Vec<&'a VocabularyEntry> {
        self.entries
            .iter()
            .filter(|entry| stats.total_guesses_for_word(&entry.english) == 0)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"[
        {"english": "water", "kannada": "ನೀರು"},
        {"english": "fire", "kannada": "ಬೆಂಕಿ "},
        {"english": "tree", "kannada": "ಮರ"}
    ]"#;

    fn sample() -> Vocabulary {
        Vocabulary::from_json(SAMPLE).unwrap()
    }

    #[test]
    fn test_from_json() {
        let vocab = sample();
        assert_eq!(vocab.len(), 3);
        assert!(vocab.contains("fire"));
        assert_eq!(vocab.get("tree").unwrap().kannada, "ಮರ");
        assert!(vocab.get("sky").is_none());
    }

    #[test]
    fn test_check_answer_trims_whitespace() {
        let vocab = sample();

        let check = vocab.check_answer("fire", "  ಬೆಂಕಿ").unwrap();
        assert!(check.correct);
        assert_eq!(check.expected, "ಬೆಂಕಿ");

        let check = vocab.check_answer("water", "ಮರ").unwrap();
        assert!(!check.correct);
        assert_eq!(check.expected, "ನೀರು");
    }

    #[test]
    fn test_check_unknown_word() {
        let err = sample().check_answer("sky", "x").unwrap_err();
        assert!(matches!(err, KalikeError::Vocabulary { .. }));
    }

    #[test]
    fn test_duplicates_keep_first() {
        let vocab = Vocabulary::from_entries(vec![
            VocabularyEntry::new("water", "ನೀರು"),
            VocabularyEntry::new("water", "ಜಲ"),
        ]);
        assert_eq!(vocab.len(), 1);
        assert_eq!(vocab.get("water").unwrap().kannada, "ನೀರು");
    }

    #[test]
    fn test_unattempted() {
        let vocab = sample();
        let mut stats = UserStats::default();
        stats.record_guess("fire", true, Utc::now());

        let words: Vec<&str> = vocab
            .unattempted(&stats)
            .iter()
            .map(|e| e.english.as_str())
            .collect();
        assert_eq!(words, vec!["water", "tree"]);
    }

    #[test]
    fn test_load_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let vocab = Vocabulary::load(file.path()).unwrap();
        assert_eq!(vocab.len(), 3);
    }

    #[test]
    fn test_load_invalid_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{\"english\": \"not a list\"}").unwrap();

        let err = Vocabulary::load(file.path()).unwrap_err();
        assert!(matches!(err, KalikeError::Vocabulary { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Vocabulary::load(Path::new("/nonexistent/vocab.json")).unwrap_err();
        assert!(matches!(err, KalikeError::Storage { .. }));
    }
}

//! Stats storage traits for Kalike.
//!
//! This module defines the `StatsStore` trait for stats persistence and the
//! keys and partial updates it works with.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::error::{KalikeError, Result};
use crate::stats::{DocumentShape, GuessEvent, StatsDocument};

/// Which stats document a store operation targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StatsKey {
    /// Local data for a learner who is not signed in.
    Guest,
    /// Remote-style document for a signed-in account.
    Account(String),
}

impl StatsKey {
    /// Build an account key, rejecting ids that cannot be used as file names.
    pub fn account(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if !is_valid_account_id(&id) {
            return Err(KalikeError::config(format!(
                "invalid account id '{}': use letters, digits, '.', '_', '-' or '@'",
                id
            )));
        }
        Ok(StatsKey::Account(id))
    }

    /// Document shape this key is persisted in.
    pub fn shape(&self) -> DocumentShape {
        match self {
            StatsKey::Guest => DocumentShape::Pairs,
            StatsKey::Account(_) => DocumentShape::Flat,
        }
    }

    /// Whether the store supports incremental appends for this key.
    pub fn supports_append(&self) -> bool {
        matches!(self, StatsKey::Account(_))
    }
}

impl fmt::Display for StatsKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatsKey::Guest => write!(f, "guest"),
            StatsKey::Account(id) => write!(f, "account:{}", id),
        }
    }
}

/// Check that an account id is a safe, non-hidden file stem.
pub fn is_valid_account_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 128
        && !id.starts_with('.')
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '@'))
}

/// A partial update recording one guess.
///
/// The event is array-unioned into the word's history (an identical event is
/// not added twice). The counters and `lastUpdated` overwrite whatever the
/// document held.
#[derive(Debug, Clone, PartialEq)]
pub struct GuessUpdate {
    pub word: String,
    pub event: GuessEvent,
    pub games_played: u64,
    pub correct_answers: u64,
    pub total_answers: u64,
    pub last_updated: DateTime<Utc>,
}

impl GuessUpdate {
    /// Apply this update to a stored document.
    ///
    /// Fails when `wordGuesses` has an unexpected type, leaving the document
    /// untouched.
    pub fn apply_to(&self, document: &mut StatsDocument) -> Result<()> {
        let event = serde_json::to_value(self.event)?;

        if document.word_guesses.is_null() {
            document.word_guesses = Value::Object(Map::new());
        }

        let history = match &mut document.word_guesses {
            Value::Object(map) => map
                .entry(self.word.clone())
                .or_insert_with(|| Value::Array(Vec::new())),
            Value::Array(pairs) => {
                let position = pairs.iter().position(|pair| {
                    pair.get(0).and_then(Value::as_str) == Some(self.word.as_str())
                });
                let index = match position {
                    Some(index) => index,
                    None => {
                        pairs.push(Value::Array(vec![
                            Value::String(self.word.clone()),
                            Value::Array(Vec::new()),
                        ]));
                        pairs.len() - 1
                    }
                };
                match pairs[index].get_mut(1) {
                    Some(history) => history,
                    None => {
                        return Err(KalikeError::document(format!(
                            "word guess pair for '{}' has no history",
                            self.word
                        )))
                    }
                }
            }
            _ => {
                return Err(KalikeError::document(
                    "wordGuesses is neither a list nor an object",
                ))
            }
        };

        let Value::Array(events) = history else {
            return Err(KalikeError::document(format!(
                "guess history for '{}' is not a list",
                self.word
            )));
        };
        if !events.contains(&event) {
            events.push(event);
        }

        document.games_played = self.games_played;
        document.correct_answers = self.correct_answers;
        document.total_answers = self.total_answers;
        document.last_updated = Some(self.last_updated);
        Ok(())
    }
}

/// Trait for stats storage backends.
///
/// Implementations persist one [`StatsDocument`] per [`StatsKey`] and
/// support a full overwrite plus an incremental per-guess append.
pub trait StatsStore: Send + Sync {
    /// Retrieve the document for a key.
    ///
    /// Returns `Ok(None)` if no document exists.
    fn load(&self, key: &StatsKey) -> Result<Option<StatsDocument>>;

    /// Overwrite the document for a key.
    fn save(&self, key: &StatsKey, document: &StatsDocument) -> Result<()>;

    /// Append one guess to an existing document.
    ///
    /// Fails with a document error if there is nothing to append to.
    fn append_guess(&self, key: &StatsKey, update: &GuessUpdate) -> Result<()>;

    /// Delete the document for a key.
    ///
    /// Returns `Ok(())` even if the document doesn't exist.
    fn delete(&self, key: &StatsKey) -> Result<()>;

    /// Ids of every stored account document, sorted.
    fn list_accounts(&self) -> Result<Vec<String>>;
}

/// Blanket implementation of StatsStore for Arc-wrapped stores.
///
/// This allows sharing one store between a session and the code inspecting it.
impl<T: StatsStore + ?Sized> StatsStore for Arc<T> {
    fn load(&self, key: &StatsKey) -> Result<Option<StatsDocument>> {
        (**self).load(key)
    }

    fn save(&self, key: &StatsKey, document: &StatsDocument) -> Result<()> {
        (**self).save(key, document)
    }

    fn append_guess(&self, key: &StatsKey, update: &GuessUpdate) -> Result<()> {
        (**self).append_guess(key, update)
    }

    fn delete(&self, key: &StatsKey) -> Result<()> {
        (**self).delete(key)
    }

    fn list_accounts(&self) -> Result<Vec<String>> {
        (**self).list_accounts()
    }
}

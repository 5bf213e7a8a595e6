//! The persisted stats document.
//!
//! Two shapes exist. Local guest data stores `wordGuesses` as a list of
//! `[word, [events]]` pairs; account documents store it as a flat object
//! keyed by word. Both carry the answer counters and a `lastUpdated`
//! timestamp. Either shape loads into the same [`Stats`].

use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Map, Value};

use crate::error::{KalikeError, Result};
use crate::stats::{GuessEvent, Stats};

/// Layout of the `wordGuesses` field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentShape {
    /// `[[word, [events]], ...]`
    #[default]
    Pairs,
    /// `{word: [events], ...}`
    Flat,
}

impl DocumentShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentShape::Pairs => "pairs",
            DocumentShape::Flat => "flat",
        }
    }
}

impl std::str::FromStr for DocumentShape {
    type Err = KalikeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pairs" => Ok(DocumentShape::Pairs),
            "flat" => Ok(DocumentShape::Flat),
            other => Err(KalikeError::document(format!(
                "unknown document shape '{}', expected 'pairs' or 'flat'",
                other
            ))),
        }
    }
}

/// Stats as they are written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsDocument {
    #[serde(default, deserialize_with = "lenient_count")]
    pub games_played: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub correct_answers: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_answers: u64,
    /// Either shape; decoded leniently by [`StatsDocument::into_stats`].
    #[serde(default)]
    pub word_guesses: Value,
    /// RFC 3339 when written here; epoch milliseconds are also accepted.
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_updated: Option<DateTime<Utc>>,
}

impl StatsDocument {
    /// Build a document from stats in the requested shape.
    pub fn export(stats: &Stats, shape: DocumentShape, now: DateTime<Utc>) -> Self {
        let word_guesses = match shape {
            DocumentShape::Pairs => Value::Array(
                stats
                    .word_guesses
                    .iter()
                    .map(|(word, guesses)| {
                        Value::Array(vec![Value::String(word.clone()), events_to_value(guesses)])
                    })
                    .collect(),
            ),
            DocumentShape::Flat => Value::Object(
                stats
                    .word_guesses
                    .iter()
                    .map(|(word, guesses)| (word.clone(), events_to_value(guesses)))
                    .collect::<Map<String, Value>>(),
            ),
        };

        Self {
            games_played: stats.games_played,
            correct_answers: stats.correct_answers,
            total_answers: stats.total_answers,
            word_guesses,
            last_updated: Some(now),
        }
    }

    /// The shape of `wordGuesses`, if it is one of the two known layouts.
    pub fn shape(&self) -> Option<DocumentShape> {
        match &self.word_guesses {
            Value::Array(_) => Some(DocumentShape::Pairs),
            Value::Object(_) => Some(DocumentShape::Flat),
            _ => None,
        }
    }

    /// Decode into stats.
    ///
    /// A `wordGuesses` of the wrong JSON type decodes as empty. Individual
    /// entries or events that do not parse are skipped. Both cases log a
    /// warning. Counters are copied verbatim; the engine reconciles them on
    /// load.
    pub fn into_stats(self) -> Stats {
        let mut word_guesses: BTreeMap<String, Vec<GuessEvent>> = BTreeMap::new();

        match self.word_guesses {
            Value::Array(pairs) => {
                for pair in pairs {
                    match pair {
                        Value::Array(mut items) if items.len() == 2 => {
                            let events = items.pop().unwrap_or(Value::Null);
                            let word = items.pop().unwrap_or(Value::Null);
                            match word {
                                Value::String(word) => {
                                    let decoded = decode_events(&word, events);
                                    word_guesses.entry(word).or_default().extend(decoded);
                                }
                                other => {
                                    tracing::warn!(key = %other, "skipping word guess entry with non-string key");
                                }
                            }
                        }
                        other => {
                            tracing::warn!(entry = %other, "skipping malformed word guess pair");
                        }
                    }
                }
            }
            Value::Object(map) => {
                for (word, events) in map {
                    let decoded = decode_events(&word, events);
                    word_guesses.insert(word, decoded);
                }
            }
            Value::Null => {}
            other => {
                tracing::warn!(
                    found = json_type_name(&other),
                    "wordGuesses is neither a list nor an object, treating as empty"
                );
            }
        }

        word_guesses.retain(|_, guesses| !guesses.is_empty());

        Stats {
            games_played: self.games_played,
            correct_answers: self.correct_answers,
            total_answers: self.total_answers,
            word_guesses,
        }
    }

    /// Parse a document from JSON text.
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| KalikeError::document(format!("invalid stats document: {}", e)))
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn events_to_value(guesses: &[GuessEvent]) -> Value {
    Value::Array(
        guesses
            .iter()
            .map(|g| json!({"correct": g.correct, "date": g.date.timestamp_millis()}))
            .collect(),
    )
}

/// Counters the engine reconciles anyway: anything but a non-negative
/// integer decodes as 0.
fn lenient_count<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(0);
    }
    Ok(value.as_u64().unwrap_or_else(|| {
        tracing::warn!(found = %value, "stats counter is not a non-negative integer, using 0");
        0
    }))
}

/// `lastUpdated` as RFC 3339 text or epoch milliseconds; anything else is dropped.
fn lenient_timestamp<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let parsed = match &value {
        Value::Null => return Ok(None),
        Value::String(text) => DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|date| date.with_timezone(&Utc)),
        Value::Number(number) => number
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
        _ => None,
    };
    if parsed.is_none() {
        tracing::warn!(found = %value, "unreadable lastUpdated, ignoring");
    }
    Ok(parsed)
}

fn decode_events(word: &str, events: Value) -> Vec<GuessEvent> {
    let Value::Array(items) = events else {
        tracing::warn!(word, "guess history is not a list, skipping");
        return Vec::new();
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<GuessEvent>(item) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::warn!(word, error = %e, "skipping malformed guess event");
                None
            }
        })
        .collect()
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

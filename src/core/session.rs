//! Learner sessions.
//!
//! A [`LearnerSession`] owns the expertise engine for one principal (a guest
//! or a signed-in account) together with the store its stats persist to.
//! Opening a session loads, evicts and writes back; every answer is
//! persisted immediately.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::Config;
use crate::error::{FailOpen, KalikeError, Result};
use crate::stats::{EvictionReport, LevelResult, StatsDocument, UserStats};
use crate::storage::{GuessUpdate, StatsKey, StatsStore};

/// Who is practicing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Principal {
    /// Not signed in; stats stay local.
    Guest,
    /// Signed in; stats live in the account's document.
    Account {
        id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        display_name: Option<String>,
    },
}

impl Principal {
    /// An account principal without a display name.
    pub fn account(id: impl Into<String>) -> Self {
        Principal::Account {
            id: id.into(),
            display_name: None,
        }
    }

    /// Storage key for this principal's stats.
    pub fn key(&self) -> Result<StatsKey> {
        match self {
            Principal::Guest => Ok(StatsKey::Guest),
            Principal::Account { id, .. } => StatsKey::account(id.as_str()),
        }
    }

    /// Name to show the learner.
    pub fn display_name(&self) -> &str {
        match self {
            Principal::Guest => "Guest",
            Principal::Account {
                display_name: Some(name),
                ..
            } => name.as_str(),
            Principal::Account { id, .. } => id.as_str(),
        }
    }

    pub fn is_guest(&self) -> bool {
        matches!(self, Principal::Guest)
    }
}

/// One principal's live stats, bound to a store.
#[derive(Debug)]
pub struct LearnerSession<S: StatsStore> {
    store: S,
    principal: Principal,
    key: StatsKey,
    stats: UserStats,
    config: Config,
}

impl<S: StatsStore> LearnerSession<S> {
    /// Open a session: load stats, evict stale history and write back any
    /// change. A signed-in account without a document gets a fresh one.
    ///
    /// A stored document that cannot be parsed is logged and ignored; the
    /// session starts empty and the next save replaces the document.
    pub fn open(store: S, principal: Principal, config: &Config, now: DateTime<Utc>) -> Result<Self> {
        let key = principal.key()?;
        let mut session = Self {
            store,
            principal,
            key,
            stats: UserStats::new(config),
            config: config.clone(),
        };

        let mut unreadable = false;
        let stored = match session.store.load(&session.key) {
            Err(e @ KalikeError::Document { .. }) => {
                unreadable = true;
                Err::<Option<StatsDocument>, _>(e).fail_open_with(
                    &format!("unreadable stats document for {}, starting fresh", session.key),
                    None,
                )
            }
            other => other?,
        };

        match stored {
            Some(document) => {
                let report = session.stats.load(document.into_stats(), now);
                if report.changed {
                    tracing::info!(
                        key = %session.key,
                        removed = report.removed_count,
                        "stats changed on load, saving"
                    );
                    session.save(now)?;
                }
            }
            // Left on disk until the first save replaces it
            None if unreadable => {}
            None if session.key.supports_append() => {
                tracing::info!(key = %session.key, "creating stats document for new account");
                session.save(now)?;
            }
            None => {
                tracing::debug!(key = %session.key, "no stored stats, starting fresh");
            }
        }

        Ok(session)
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn key(&self) -> &StatsKey {
        &self.key
    }

    /// The expertise engine.
    pub fn stats(&self) -> &UserStats {
        &self.stats
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Record an answer, persist it and return the word's new mastery.
    pub fn record_guess(&mut self, word: &str, correct: bool, now: DateTime<Utc>) -> Result<f64> {
        let expertise = self.stats.record_guess(word, correct, now);
        self.persist_guess(word, now)?;
        Ok(expertise)
    }

    /// Show the answer for `word`; recorded as an incorrect guess.
    pub fn reveal_answer(&mut self, word: &str, now: DateTime<Utc>) -> Result<f64> {
        let expertise = self.stats.record_reveal(word, now);
        self.persist_guess(word, now)?;
        Ok(expertise)
    }

    /// Count a completed game.
    pub fn finish_game(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.stats.record_game_played();
        self.save(now)
    }

    /// Current level for the given vocabulary size.
    pub fn level(&self, vocabulary_size: usize) -> LevelResult {
        self.stats.expertise_level(vocabulary_size)
    }

    /// Run eviction now, persisting if anything was dropped.
    pub fn evict(&mut self, now: DateTime<Utc>) -> Result<EvictionReport> {
        let report = self.stats.evict(now);
        if report.changed {
            self.save(now)?;
        }
        Ok(report)
    }

    /// Replace the stored stats with imported ones.
    pub fn import(&mut self, document: StatsDocument, now: DateTime<Utc>) -> Result<EvictionReport> {
        let report = self.stats.load(document.into_stats(), now);
        self.save(now)?;
        Ok(report)
    }

    /// Clear all stats for this principal.
    pub fn reset(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.stats.reset();
        self.save(now)
    }

    /// Export the current stats in this principal's document shape.
    pub fn export(&self, now: DateTime<Utc>) -> StatsDocument {
        StatsDocument::export(self.stats.stats(), self.key.shape(), now)
    }

    /// Overwrite the stored document with the current stats.
    pub fn save(&self, now: DateTime<Utc>) -> Result<()> {
        self.store.save(&self.key, &self.export(now))
    }

    /// Sign out and continue as a fresh guest.
    ///
    /// Local guest data is cleared so the next learner on this device starts
    /// from nothing. The account's document is left as it is.
    pub fn sign_out(self, now: DateTime<Utc>) -> Result<LearnerSession<S>> {
        tracing::info!(principal = self.principal.display_name(), "signing out");
        self.store.delete(&StatsKey::Guest)?;
        LearnerSession::open(self.store, Principal::Guest, &self.config, now)
    }

    fn persist_guess(&self, word: &str, now: DateTime<Utc>) -> Result<()> {
        // After-update eviction may have removed history an append cannot express
        if !self.key.supports_append() || self.config.eviction.evict_after_update {
            return self.save(now);
        }

        let Some(event) = self.stats.word_guess_history(word).last().copied() else {
            return self.save(now);
        };
        let stats = self.stats.stats();
        let update = GuessUpdate {
            word: word.to_string(),
            event,
            games_played: stats.games_played,
            correct_answers: stats.correct_answers,
            total_answers: stats.total_answers,
            last_updated: now,
        };

        match self.store.append_guess(&self.key, &update) {
            Ok(()) => Ok(()),
            Err(e) if e.is_retryable_as_full_save() => {
                tracing::warn!(key = %self.key, error = %e, "append failed, falling back to full save");
                self.save(now)
            }
            Err(e) => Err(e),
        }
    }
}

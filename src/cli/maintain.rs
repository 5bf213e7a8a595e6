//! Maintain command for Kalike.
//!
//! Housekeeping on a learner's stats: evict stale history, export or import
//! the stats document, reset, and list the accounts stored on this device.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::LearnerSession;
use crate::error::{KalikeError, Result};
use crate::stats::{DocumentShape, EvictionReport, StatsDocument};
use crate::storage::StatsStore;

/// Options for the maintain command.
#[derive(Debug, Clone, Default)]
pub struct MaintainOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Actions available in maintain.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum MaintainAction {
    /// Drop guesses older than the eviction window.
    Evict,
    /// Write the stats document, to a file or stdout.
    Export {
        shape: DocumentShape,
        output: Option<PathBuf>,
    },
    /// Replace the stats with a document from a file.
    Import { path: PathBuf },
    /// Clear all stats.
    Reset,
    /// List accounts with a stored stats document.
    Accounts,
}

impl MaintainAction {
    fn name(&self) -> &'static str {
        match self {
            MaintainAction::Evict => "evict",
            MaintainAction::Export { .. } => "export",
            MaintainAction::Import { .. } => "import",
            MaintainAction::Reset => "reset",
            MaintainAction::Accounts => "accounts",
        }
    }
}

/// Output format for the maintain command.
#[derive(Debug, Clone, Serialize)]
pub struct MaintainOutput {
    /// Whether the operation was successful.
    pub success: bool,
    /// The action performed.
    pub action: String,
    /// Eviction outcome (evict and import).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eviction: Option<EvictionReport>,
    /// Where the export was written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exported_to: Option<String>,
    /// The exported document, when written to stdout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<StatsDocument>,
    /// Stored account ids (accounts only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accounts: Option<Vec<String>>,
    /// Words with stored guesses after the action.
    pub words_remaining: usize,
    /// Error message if operation failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MaintainOutput {
    fn done(action: &str, words_remaining: usize) -> Self {
        Self {
            success: true,
            action: action.to_string(),
            eviction: None,
            exported_to: None,
            document: None,
            accounts: None,
            words_remaining,
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(action: &str, error: impl Into<String>) -> Self {
        Self {
            success: false,
            action: action.to_string(),
            eviction: None,
            exported_to: None,
            document: None,
            accounts: None,
            words_remaining: 0,
            error: Some(error.into()),
        }
    }
}

/// The maintain command implementation.
pub struct MaintainCommand<S: StatsStore> {
    session: LearnerSession<S>,
    now: DateTime<Utc>,
}

impl<S: StatsStore> MaintainCommand<S> {
    /// Create a new maintain command.
    pub fn new(session: LearnerSession<S>) -> Self {
        Self {
            session,
            now: Utc::now(),
        }
    }

    /// Run at a fixed instant instead of the current time.
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    pub fn session(&self) -> &LearnerSession<S> {
        &self.session
    }

    /// Run the maintain command.
    pub fn run(&mut self, action: &MaintainAction) -> MaintainOutput {
        let name = action.name();
        let result = match action {
            MaintainAction::Evict => self.evict(),
            MaintainAction::Export { shape, output } => self.export(*shape, output.as_deref()),
            MaintainAction::Import { path } => self.import(path),
            MaintainAction::Reset => self.reset(),
            MaintainAction::Accounts => self.accounts(),
        };

        result.unwrap_or_else(|e| MaintainOutput::failure(name, e.to_string()))
    }

    fn words_remaining(&self) -> usize {
        self.session.stats().stats().word_guesses.len()
    }

    fn evict(&mut self) -> Result<MaintainOutput> {
        let report = self.session.evict(self.now)?;
        let mut output = MaintainOutput::done("evict", self.words_remaining());
        output.eviction = Some(report);
        Ok(output)
    }

    fn export(&self, shape: DocumentShape, path: Option<&Path>) -> Result<MaintainOutput> {
        let document = StatsDocument::export(self.session.stats().stats(), shape, self.now);
        let mut output = MaintainOutput::done("export", self.words_remaining());

        match path {
            Some(path) => {
                fs::write(path, document.to_json_pretty()?)
                    .map_err(|e| KalikeError::storage(path, e))?;
                output.exported_to = Some(path.display().to_string());
            }
            None => output.document = Some(document),
        }
        Ok(output)
    }

    fn import(&mut self, path: &Path) -> Result<MaintainOutput> {
        let content = fs::read_to_string(path).map_err(|e| KalikeError::storage(path, e))?;
        let document = StatsDocument::from_json(&content)?;
        let report = self.session.import(document, self.now)?;

        let mut output = MaintainOutput::done("import", self.words_remaining());
        output.eviction = Some(report);
        Ok(output)
    }

    fn reset(&mut self) -> Result<MaintainOutput> {
        self.session.reset(self.now)?;
        Ok(MaintainOutput::done("reset", 0))
    }

    fn accounts(&self) -> Result<MaintainOutput> {
        let ids = self.session.store().list_accounts()?;
        let mut output = MaintainOutput::done("accounts", self.words_remaining());
        output.accounts = Some(ids);
        Ok(output)
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &MaintainOutput, options: &MaintainOptions) -> String {
        if options.quiet {
            return String::new();
        }

        // A stdout export is the document itself
        if let Some(document) = &output.document {
            if !options.json {
                return document.to_json_pretty().unwrap_or_else(|_| "{}".to_string());
            }
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            Self::format_human_readable(output)
        }
    }

    fn format_human_readable(output: &MaintainOutput) -> String {
        if !output.success {
            return format!(
                "Maintain {} failed: {}",
                output.action,
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        match output.action.as_str() {
            "evict" => match &output.eviction {
                Some(report) if report.changed => format!(
                    "Evicted {} stale guesses ({} words removed, {} words remaining)",
                    report.removed_count, report.keys_deleted, output.words_remaining
                ),
                _ => "Nothing to evict".to_string(),
            },
            "export" => format!(
                "Exported {} words to {}",
                output.words_remaining,
                output.exported_to.as_deref().unwrap_or("stdout")
            ),
            "import" => {
                let mut line = format!("Imported {} words", output.words_remaining);
                if let Some(report) = output.eviction.filter(|r| r.removed_count > 0) {
                    line.push_str(&format!(
                        " ({} stale guesses dropped)",
                        report.removed_count
                    ));
                }
                line
            }
            "reset" => "Stats reset".to_string(),
            "accounts" => match output.accounts.as_deref() {
                Some(ids) if !ids.is_empty() => {
                    format!("Stored accounts ({}):\n  {}", ids.len(), ids.join("\n  "))
                }
                _ => "No stored accounts".to_string(),
            },
            other => format!("Maintain {} done", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::core::Principal;
    use crate::stats::{GuessEvent, Stats};
    use crate::storage::{MemoryStatsStore, StatsKey};
    use chrono::{Duration, TimeZone};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 9, 10, 12, 0, 0).unwrap()
    }

    fn command(store: &Arc<MemoryStatsStore>) -> MaintainCommand<Arc<MemoryStatsStore>> {
        let mut session =
            LearnerSession::open(Arc::clone(store), Principal::Guest, &Config::default(), now())
                .unwrap();
        session.record_guess("water", true, now()).unwrap();
        session.record_guess("fire", false, now()).unwrap();
        MaintainCommand::new(session).at(now())
    }

    #[test]
    fn test_evict_nothing_stale() {
        let store = Arc::new(MemoryStatsStore::new());
        let mut cmd = command(&store);

        let output = cmd.run(&MaintainAction::Evict);

        assert!(output.success);
        assert!(!output.eviction.unwrap().changed);
        assert_eq!(output.words_remaining, 2);
        let text = cmd.format_output(&output, &MaintainOptions::default());
        assert_eq!(text, "Nothing to evict");
    }

    #[test]
    fn test_evict_later() {
        let store = Arc::new(MemoryStatsStore::new());
        let mut cmd = command(&store).at(now() + Duration::days(31));

        let output = cmd.run(&MaintainAction::Evict);

        let report = output.eviction.unwrap();
        assert_eq!(report.removed_count, 2);
        assert_eq!(report.keys_deleted, 2);
        assert_eq!(output.words_remaining, 0);
        let stats = store.load(&StatsKey::Guest).unwrap().unwrap().into_stats();
        assert!(stats.word_guesses.is_empty());
        assert_eq!(stats.total_answers, 0);
    }

    #[test]
    fn test_export_to_file_and_import() {
        let store = Arc::new(MemoryStatsStore::new());
        let mut cmd = command(&store);
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("export.json");

        let output = cmd.run(&MaintainAction::Export {
            shape: DocumentShape::Flat,
            output: Some(path.clone()),
        });
        assert!(output.success);
        assert_eq!(output.exported_to.as_deref(), Some(path.to_str().unwrap()));

        let content = fs::read_to_string(&path).unwrap();
        let json: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert!(json["wordGuesses"]["water"].is_array());

        let other_store = Arc::new(MemoryStatsStore::new());
        let session = LearnerSession::open(
            Arc::clone(&other_store),
            Principal::Guest,
            &Config::default(),
            now(),
        )
        .unwrap();
        let mut importer = MaintainCommand::new(session).at(now());
        let output = importer.run(&MaintainAction::Import { path });

        assert!(output.success);
        assert_eq!(output.words_remaining, 2);
        let stats = other_store
            .load(&StatsKey::Guest)
            .unwrap()
            .unwrap()
            .into_stats();
        assert_eq!(stats.total_answers, 2);
    }

    #[test]
    fn test_export_to_stdout_prints_document() {
        let store = Arc::new(MemoryStatsStore::new());
        let mut cmd = command(&store);

        let output = cmd.run(&MaintainAction::Export {
            shape: DocumentShape::Pairs,
            output: None,
        });

        let text = cmd.format_output(&output, &MaintainOptions::default());
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["totalAnswers"], 2);
        assert_eq!(json["wordGuesses"][0][0], "fire");
    }

    #[test]
    fn test_import_drops_stale_history() {
        let store = Arc::new(MemoryStatsStore::new());
        let mut cmd = command(&store);
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("old.json");

        let mut stats = Stats::default();
        stats.word_guesses.insert(
            "ancient".to_string(),
            vec![GuessEvent::correct_at(now() - Duration::days(90))],
        );
        stats.word_guesses.insert(
            "recent".to_string(),
            vec![GuessEvent::correct_at(now() - Duration::days(2))],
        );
        stats.total_answers = 2;
        stats.correct_answers = 2;
        let doc = StatsDocument::export(&stats, DocumentShape::Pairs, now());
        fs::write(&path, doc.to_json_pretty().unwrap()).unwrap();

        let output = cmd.run(&MaintainAction::Import { path });

        assert!(output.success);
        assert_eq!(output.words_remaining, 1);
        let text = cmd.format_output(&output, &MaintainOptions::default());
        assert_eq!(text, "Imported 1 words (1 stale guesses dropped)");
    }

    #[test]
    fn test_import_missing_file_fails() {
        let store = Arc::new(MemoryStatsStore::new());
        let mut cmd = command(&store);

        let output = cmd.run(&MaintainAction::Import {
            path: PathBuf::from("/nonexistent/stats.json"),
        });

        assert!(!output.success);
        assert_eq!(cmd.session().stats().stats().total_answers, 2);
        let text = cmd.format_output(&output, &MaintainOptions::default());
        assert!(text.starts_with("Maintain import failed:"));
    }

    #[test]
    fn test_reset() {
        let store = Arc::new(MemoryStatsStore::new());
        let mut cmd = command(&store);

        let output = cmd.run(&MaintainAction::Reset);

        assert!(output.success);
        let stats = store.load(&StatsKey::Guest).unwrap().unwrap().into_stats();
        assert_eq!(stats, Stats::default());
    }

    #[test]
    fn test_accounts_lists_stored_accounts() {
        let store = Arc::new(MemoryStatsStore::new());
        for id in ["zoe", "asha"] {
            LearnerSession::open(
                Arc::clone(&store),
                Principal::account(id),
                &Config::default(),
                now(),
            )
            .unwrap();
        }
        let mut cmd = command(&store);

        let output = cmd.run(&MaintainAction::Accounts);

        assert!(output.success);
        assert_eq!(
            output.accounts,
            Some(vec!["asha".to_string(), "zoe".to_string()])
        );
        let text = cmd.format_output(&output, &MaintainOptions::default());
        assert_eq!(text, "Stored accounts (2):\n  asha\n  zoe");
    }

    #[test]
    fn test_accounts_empty() {
        let store = Arc::new(MemoryStatsStore::new());
        let mut cmd = command(&store);

        let output = cmd.run(&MaintainAction::Accounts);

        assert_eq!(output.accounts, Some(Vec::new()));
        let text = cmd.format_output(&output, &MaintainOptions::default());
        assert_eq!(text, "No stored accounts");
    }

    #[test]
    fn test_format_output_json_and_quiet() {
        let store = Arc::new(MemoryStatsStore::new());
        let mut cmd = command(&store);
        let output = cmd.run(&MaintainAction::Evict);

        let json = cmd.format_output(
            &output,
            &MaintainOptions {
                json: true,
                quiet: false,
            },
        );
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["action"], "evict");
        assert_eq!(parsed["eviction"]["changed"], false);

        let quiet = cmd.format_output(
            &output,
            &MaintainOptions {
                json: false,
                quiet: true,
            },
        );
        assert!(quiet.is_empty());
    }

    #[test]
    fn test_maintain_action_serde() {
        let action: MaintainAction =
            serde_json::from_str(r#"{"action": "export", "shape": "flat", "output": null}"#)
                .unwrap();
        assert_eq!(
            action,
            MaintainAction::Export {
                shape: DocumentShape::Flat,
                output: None
            }
        );
    }
}

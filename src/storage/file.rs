//! File-based stats storage for Kalike.
//!
//! Guest stats live in `~/.kalike/learner-stats.json` (pair-list shape);
//! account documents live in `~/.kalike/accounts/<id>.json` (flat shape).
//! Atomic writes are achieved via temp file + rename pattern.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::{accounts_dir, guest_stats_path, kalike_home};
use crate::error::{KalikeError, Result};
use crate::stats::StatsDocument;
use crate::storage::{GuessUpdate, StatsKey, StatsStore};

/// File-based stats storage.
///
/// Uses atomic writes via temp file + rename pattern.
#[derive(Debug, Clone)]
pub struct FileStatsStore {
    /// Kalike home directory.
    home: PathBuf,
}

impl FileStatsStore {
    /// Create a store rooted at the default home directory.
    ///
    /// Uses `~/.kalike/` or `$KALIKE_HOME/`.
    pub fn new() -> Result<Self> {
        let home = kalike_home().ok_or_else(|| {
            KalikeError::config("Could not determine Kalike home directory")
        })?;
        Self::with_home(home)
    }

    /// Create a store rooted at a custom home directory.
    pub fn with_home(home: impl Into<PathBuf>) -> Result<Self> {
        let home = home.into();
        let accounts = accounts_dir(&home);

        if !accounts.exists() {
            fs::create_dir_all(&accounts).map_err(|e| KalikeError::storage(&accounts, e))?;
        }

        Ok(Self { home })
    }

    /// Home directory this store writes under.
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Get the path of the document for a key.
    pub fn document_path(&self, key: &StatsKey) -> PathBuf {
        match key {
            StatsKey::Guest => guest_stats_path(&self.home),
            StatsKey::Account(id) => accounts_dir(&self.home).join(format!("{}.json", id)),
        }
    }

    /// Get the path for a temp file used during atomic writes.
    fn temp_path(&self, key: &StatsKey) -> PathBuf {
        let final_path = self.document_path(key);
        let name = final_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        final_path.with_file_name(format!(".{}.tmp", name))
    }

    /// Write a document atomically using temp file + rename.
    fn atomic_write(&self, key: &StatsKey, document: &StatsDocument) -> Result<()> {
        let final_path = self.document_path(key);
        let temp_path = self.temp_path(key);

        let json = document.to_json_pretty()?;

        {
            let mut file =
                fs::File::create(&temp_path).map_err(|e| KalikeError::storage(&temp_path, e))?;
            file.write_all(json.as_bytes())
                .map_err(|e| KalikeError::storage(&temp_path, e))?;
            file.sync_all()
                .map_err(|e| KalikeError::storage(&temp_path, e))?;
        }

        // Rename temp file to final path (atomic on POSIX)
        fs::rename(&temp_path, &final_path).map_err(|e| KalikeError::storage(&final_path, e))?;

        Ok(())
    }
}

impl StatsStore for FileStatsStore {
    fn load(&self, key: &StatsKey) -> Result<Option<StatsDocument>> {
        let path = self.document_path(key);

        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path).map_err(|e| KalikeError::storage(&path, e))?;
        let document = StatsDocument::from_json(&content)?;

        Ok(Some(document))
    }

    fn save(&self, key: &StatsKey, document: &StatsDocument) -> Result<()> {
        self.atomic_write(key, document)?;
        tracing::debug!(%key, "stats document saved");
        Ok(())
    }

    fn append_guess(&self, key: &StatsKey, update: &GuessUpdate) -> Result<()> {
        let mut document = self.load(key)?.ok_or_else(|| {
            KalikeError::document(format!("no stats document for {} to append to", key))
        })?;

        update.apply_to(&mut document)?;
        self.atomic_write(key, &document)?;
        tracing::debug!(%key, word = %update.word, "guess appended");
        Ok(())
    }

    fn delete(&self, key: &StatsKey) -> Result<()> {
        let path = self.document_path(key);

        if path.exists() {
            fs::remove_file(&path).map_err(|e| KalikeError::storage(&path, e))?;
        }

        // Also clean up any temp file
        let temp_path = self.temp_path(key);
        if temp_path.exists() {
            let _ = fs::remove_file(&temp_path);
        }

        Ok(())
    }

    fn list_accounts(&self) -> Result<Vec<String>> {
        let dir = accounts_dir(&self.home);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&dir).map_err(|e| KalikeError::storage(&dir, e))?;

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| KalikeError::storage(&dir, e))?;
            let path = entry.path();

            // Skip non-JSON files and temp files
            if path.extension().map(|e| e != "json").unwrap_or(true) {
                continue;
            }
            let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
                continue;
            };
            if stem.starts_with('.') {
                continue;
            }
            ids.push(stem);
        }

        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{DocumentShape, GuessEvent, Stats};
    use crate::storage::traits::tests::{fixed_now, sample_update, test_stats_store_crud};
    use tempfile::TempDir;

    fn create_test_store() -> (FileStatsStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = FileStatsStore::with_home(dir.path()).unwrap();
        (store, dir)
    }

    fn guest_document() -> StatsDocument {
        let mut stats = Stats::default();
        stats
            .word_guesses
            .insert("water".to_string(), vec![GuessEvent::correct_at(fixed_now())]);
        stats.total_answers = 1;
        stats.correct_answers = 1;
        StatsDocument::export(&stats, DocumentShape::Pairs, fixed_now())
    }

    #[test]
    fn test_file_stats_store_crud() {
        let (store, _dir) = create_test_store();
        test_stats_store_crud(&store);
    }

    #[test]
    fn test_with_home_creates_accounts_directory() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("kalike");

        assert!(!home.exists());

        let _store = FileStatsStore::with_home(&home).unwrap();

        assert!(home.join("accounts").is_dir());
    }

    #[test]
    fn test_document_paths() {
        let (store, dir) = create_test_store();

        assert_eq!(
            store.document_path(&StatsKey::Guest),
            dir.path().join("learner-stats.json")
        );
        assert_eq!(
            store.document_path(&StatsKey::Account("abc".into())),
            dir.path().join("accounts").join("abc.json")
        );
    }

    #[test]
    fn test_guest_save_and_load() {
        let (store, _dir) = create_test_store();
        let document = guest_document();

        store.save(&StatsKey::Guest, &document).unwrap();

        let loaded = store.load(&StatsKey::Guest).unwrap().unwrap();
        assert_eq!(loaded.shape(), Some(DocumentShape::Pairs));
        assert_eq!(loaded.into_stats(), document.into_stats());
    }

    #[test]
    fn test_saved_file_is_camel_case_json() {
        let (store, _dir) = create_test_store();
        store.save(&StatsKey::Guest, &guest_document()).unwrap();

        let content = fs::read_to_string(store.document_path(&StatsKey::Guest)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(json["totalAnswers"], 1);
        assert_eq!(json["wordGuesses"][0][0], "water");
        assert!(json["lastUpdated"].is_string());
    }

    #[test]
    fn test_temp_file_cleaned_up() {
        let (store, _dir) = create_test_store();
        store.save(&StatsKey::Guest, &guest_document()).unwrap();
        assert!(!store.temp_path(&StatsKey::Guest).exists());
    }

    #[test]
    fn test_corrupt_file_is_document_error() {
        let (store, _dir) = create_test_store();
        fs::write(store.document_path(&StatsKey::Guest), "not valid json").unwrap();

        let err = store.load(&StatsKey::Guest).unwrap_err();
        assert!(matches!(err, KalikeError::Document { .. }));
    }

    #[test]
    fn test_append_persists_to_disk() {
        let (store, _dir) = create_test_store();
        let key = StatsKey::account("reader").unwrap();
        store
            .save(
                &key,
                &StatsDocument::export(&Stats::default(), DocumentShape::Flat, fixed_now()),
            )
            .unwrap();

        store.append_guess(&key, &sample_update("sun", false)).unwrap();

        let reopened = FileStatsStore::with_home(store.home()).unwrap();
        let stats = reopened.load(&key).unwrap().unwrap().into_stats();
        assert_eq!(stats.word_guesses["sun"].len(), 1);
        assert!(!stats.word_guesses["sun"][0].correct);
    }

    #[test]
    fn test_list_accounts_ignores_other_files() {
        let (store, dir) = create_test_store();
        let doc = StatsDocument::export(&Stats::default(), DocumentShape::Flat, fixed_now());
        store.save(&StatsKey::account("b").unwrap(), &doc).unwrap();
        store.save(&StatsKey::account("a").unwrap(), &doc).unwrap();

        fs::write(dir.path().join("accounts").join(".c.json.tmp"), "{}").unwrap();
        fs::write(dir.path().join("accounts").join("notes.txt"), "x").unwrap();

        assert_eq!(store.list_accounts().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_delete_nonexistent() {
        let (store, _dir) = create_test_store();
        store.delete(&StatsKey::Guest).unwrap();
    }
}

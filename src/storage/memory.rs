//! In-memory stats storage for testing.
//!
//! This module provides a thread-safe in-memory implementation of the
//! StatsStore trait, primarily for use in unit tests. Appends can be made to
//! fail on demand to exercise the full-save fallback.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{KalikeError, Result};
use crate::stats::StatsDocument;
use crate::storage::{GuessUpdate, StatsKey, StatsStore};

/// In-memory stats store for testing.
///
/// Thread-safe implementation using `RwLock<HashMap>`.
#[derive(Debug, Default)]
pub struct MemoryStatsStore {
    documents: RwLock<HashMap<StatsKey, StatsDocument>>,
    fail_appends: AtomicBool,
    saves: AtomicUsize,
    appends: AtomicUsize,
}

impl MemoryStatsStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<StatsKey, StatsDocument>> {
        self.documents.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<StatsKey, StatsDocument>> {
        self.documents.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Get the number of documents in the store.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Make every subsequent append fail (or succeed again).
    pub fn set_fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    /// Number of successful full saves.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Number of successful appends.
    pub fn append_count(&self) -> usize {
        self.appends.load(Ordering::SeqCst)
    }
}

impl StatsStore for MemoryStatsStore {
    fn load(&self, key: &StatsKey) -> Result<Option<StatsDocument>> {
        Ok(self.read().get(key).cloned())
    }

    fn save(&self, key: &StatsKey, document: &StatsDocument) -> Result<()> {
        self.write().insert(key.clone(), document.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn append_guess(&self, key: &StatsKey, update: &GuessUpdate) -> Result<()> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(KalikeError::document(format!(
                "append to {} rejected",
                key
            )));
        }

        let mut documents = self.write();
        let document = documents.get_mut(key).ok_or_else(|| {
            KalikeError::document(format!("no stats document for {} to append to", key))
        })?;

        update.apply_to(document)?;
        self.appends.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn delete(&self, key: &StatsKey) -> Result<()> {
        self.write().remove(key);
        Ok(())
    }

    fn list_accounts(&self) -> Result<Vec<String>> {
        let mut ids: Vec<String> = self
            .read()
            .keys()
            .filter_map(|key| match key {
                StatsKey::Account(id) => Some(id.clone()),
                StatsKey::Guest => None,
            })
            .collect();
        ids.sort();
        Ok(ids)
    }
}

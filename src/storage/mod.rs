//! Stats storage for Kalike.
//!
//! This module provides persistent storage for learner stats documents,
//! supporting file-based and in-memory backends.

pub mod file;
pub mod memory;
pub mod traits;

pub use file::FileStatsStore;
pub use memory::MemoryStatsStore;
pub use traits::{is_valid_account_id, GuessUpdate, StatsKey, StatsStore};

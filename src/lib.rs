//! Kalike - vocabulary expertise tracking
//!
//! Kalike tracks a learner's right and wrong answers per vocabulary word and
//! turns them into a time-decayed mastery score per word, a
//! coverage-adjusted overall expertise, and a place on a ten-tier level
//! ladder. Stats persist locally for guests and per account when signed in.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod stats;
pub mod storage;
pub mod vocabulary;

pub use config::Config;
pub use core::{LearnerSession, Principal};
pub use error::{KalikeError, Result};
pub use stats::{
    level_for, DocumentShape, EvictionReport, ExpertiseLevel, ExpertiseSummary, GuessEvent,
    LevelResult, Stats, StatsDocument, UserStats, EXPERTISE_LEVELS,
};
pub use storage::{FileStatsStore, MemoryStatsStore, StatsKey, StatsStore};
pub use vocabulary::{Vocabulary, VocabularyEntry};

// CLI commands
pub use cli::{MaintainCommand, RecordCommand, StatsCommand, WordsCommand};

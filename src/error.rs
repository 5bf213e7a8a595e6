//! Unified error types for Kalike with fail-open philosophy.
//!
//! The expertise engine itself never fails. Errors only come from the
//! boundaries around it: stats stores, config files, vocabulary files and
//! document decoding. Callers that must keep a practice session running use
//! [`FailOpen`] to log a warning and continue with a safe default.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for Kalike operations.
#[derive(Error, Debug)]
pub enum KalikeError {
    /// I/O errors from stats, config or vocabulary files.
    #[error("storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// JSON or TOML parsing/serialization errors.
    #[error("serialization error: {message}")]
    Serde { message: String },

    /// Configuration loading or validation errors.
    #[error("config error: {message}")]
    Config { message: String },

    /// Stats document errors (missing document, rejected partial update).
    #[error("document error: {message}")]
    Document { message: String },

    /// Vocabulary loading or lookup errors.
    #[error("vocabulary error: {message}")]
    Vocabulary { message: String },
}

/// A specialized Result type for Kalike operations.
pub type Result<T> = std::result::Result<T, KalikeError>;

impl KalikeError {
    /// Create a storage error from an I/O error.
    pub fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Create a serialization error.
    pub fn serde(message: impl Into<String>) -> Self {
        Self::Serde {
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a document error.
    pub fn document(message: impl Into<String>) -> Self {
        Self::Document {
            message: message.into(),
        }
    }

    /// Create a vocabulary error.
    pub fn vocabulary(message: impl Into<String>) -> Self {
        Self::Vocabulary {
            message: message.into(),
        }
    }

    /// Whether a failed incremental update should fall back to a full save.
    ///
    /// Document and storage errors mean the partial write never landed, so
    /// overwriting the whole document is the recovery. Serialization errors
    /// would fail the same way on a full save.
    pub fn is_retryable_as_full_save(&self) -> bool {
        matches!(self, Self::Document { .. } | Self::Storage { .. })
    }
}

impl From<io::Error> for KalikeError {
    fn from(err: io::Error) -> Self {
        Self::Storage {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for KalikeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde {
            message: err.to_string(),
        }
    }
}

/// Trait for fail-open error handling.
///
/// Log the error and return a safe default so a broken store or config file
/// never stops a learner from practicing.
pub trait FailOpen<T> {
    /// Handle an error by logging a warning and returning the default value.
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default;

    /// Handle an error by logging a warning and returning the provided fallback.
    fn fail_open_with(self, context: &str, fallback: T) -> T;
}

impl<T> FailOpen<T> for Result<T> {
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default,
    {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("{}: {} (fail-open: using default)", context, err);
                T::default()
            }
        }
    }

    fn fail_open_with(self, context: &str, fallback: T) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("{}: {} (fail-open: using fallback)", context, err);
                fallback
            }
        }
    }
}

/// Process exit codes for the `kalike` binary.
pub mod exit_codes {
    /// Command completed.
    pub const SUCCESS: i32 = 0;

    /// Command failed at a boundary (store, config, vocabulary).
    pub const FAILURE: i32 = 1;

    /// The process panicked.
    pub const CRASH: i32 = 3;
}

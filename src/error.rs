//! Error types for tracking-log conversion

use std::path::PathBuf;
use thiserror::Error;

/// Result type for conversion operations.
pub type Result<T> = std::result::Result<T, TrackingError>;

/// Errors that can occur while discovering, parsing or writing a game.
#[derive(Error, Debug)]
pub enum TrackingError {
    /// Game has no tracking directory or no quarter documents.
    #[error("Missing tracking data: {0}")]
    MissingData(String),

    /// XML syntax error or a missing header element/attribute.
    #[error("Malformed document '{path}': {reason}")]
    MalformedDocument {
        /// Quarter document path.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },

    /// A `locations` entry with the wrong number of fields.
    #[error("Malformed location entry '{entry}': expected {expected} fields, found {found}")]
    MalformedLocationEntry {
        /// Raw entry text.
        entry: String,
        /// Number of fields an entry must have.
        expected: usize,
        /// Number of comma-separated fields found.
        found: usize,
    },

    /// Output CSV could not be written.
    #[error("Failed to write '{path}': {source}")]
    WriteFailure {
        /// Target CSV path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Season directory listing failed.
    #[error("Discovery error: {0}")]
    Discovery(#[from] walkdir::Error),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TrackingError {
    /// Whether this error means the game should be skipped rather than failed.
    pub fn is_missing_data(&self) -> bool {
        matches!(self, TrackingError::MissingData(_))
    }

    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        TrackingError::MalformedDocument {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn write_failure(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TrackingError::WriteFailure {
            path: path.into(),
            source,
        }
    }
}

impl From<serde_json::Error> for TrackingError {
    fn from(err: serde_json::Error) -> Self {
        TrackingError::Config(err.to_string())
    }
}

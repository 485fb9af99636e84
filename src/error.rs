//! Error types for the advisor analysis engine.
//!
//! Only structurally unreadable input escapes `analyze`. Everything softer
//! (missing columns, discarded rows, unparseable savings) is reported as data
//! in `AnalysisResult::metadata`.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for advisor_report operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AnalysisError {
    /// Input that is not tabular at all. Callers should not retry.
    #[error("Unreadable input: {context}")]
    Unreadable {
        context: String,
        #[source]
        source: InputErrorKind,
    },

    /// IO errors with context
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: Option<PathBuf>,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Errors while writing reports
    #[error("Output failed: {0}")]
    Output(String),
}

/// Specific reasons an input table could not be read
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum InputErrorKind {
    #[error("table has {rows} rows but no columns")]
    NoColumns { rows: usize },

    #[error("invalid CSV structure: {0}")]
    InvalidCsv(String),

    #[error("invalid JSON structure: {0}")]
    InvalidJson(String),

    #[error("unsupported file extension: {0}")]
    UnsupportedFormat(String),
}

/// Convenient Result type for advisor_report operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

impl AnalysisError {
    /// Create an unreadable-input error with context
    pub fn unreadable(context: impl Into<String>, source: InputErrorKind) -> Self {
        Self::Unreadable {
            context: context.into(),
            source,
        }
    }

    /// Wrap an IO error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: Some(path.into()),
            source,
        }
    }

    /// Whether retrying the same input could ever succeed
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}

impl From<csv::Error> for AnalysisError {
    fn from(err: csv::Error) -> Self {
        Self::unreadable("CSV export", InputErrorKind::InvalidCsv(err.to_string()))
    }
}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        Self::unreadable("JSON export", InputErrorKind::InvalidJson(err.to_string()))
    }
}

impl From<serde_yaml::Error> for AnalysisError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Config(err.to_string())
    }
}

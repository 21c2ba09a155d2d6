//! Error types for sweeper.

use sweeper_table::TableError;
use thiserror::Error;

/// Result type for sweeper operations.
pub type SweeperResult<T> = Result<T, SweeperError>;

/// Errors that can occur in the session pipeline.
///
/// Every variant is local to one file and one action: the session keeps
/// working after any of them.
#[derive(Debug, Error)]
pub enum SweeperError {
    /// Loading, transforming or writing a table failed.
    #[error(transparent)]
    Table(#[from] TableError),

    /// An action named a file that has not been uploaded.
    #[error("File not loaded: {name}")]
    FileNotLoaded { name: String },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SweeperError {
    /// Create a file-not-loaded error.
    pub fn not_loaded(name: impl Into<String>) -> Self {
        Self::FileNotLoaded { name: name.into() }
    }

    /// Whether this error means the uploaded file should be skipped.
    #[must_use]
    pub fn is_unsupported_format(&self) -> bool {
        matches!(self, Self::Table(TableError::UnsupportedFormat { .. }))
    }
}

//! Error types for pulsebook-store.

use std::path::PathBuf;

/// Result type for pulsebook-store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in pulsebook-store.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Database error from SQLite.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A statement failed while writing an import. The whole import was
    /// rolled back.
    #[error("Import rolled back: {source}")]
    Transaction { source: rusqlite::Error },

    /// The database file does not exist.
    #[error("No database at {}", .0.display())]
    Unavailable(PathBuf),

    /// Failed to create database directory.
    #[error("Failed to create database directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A stored date could not be parsed.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn transaction(source: rusqlite::Error) -> Self {
        Error::Transaction { source }
    }
}

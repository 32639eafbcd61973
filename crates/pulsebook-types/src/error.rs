//! Error types for health export parsing.

use thiserror::Error;

/// Errors that abort an import because the document itself is unusable.
///
/// Individual records that cannot be used (unknown type, missing timestamp,
/// non-numeric value) are not errors; importers skip them silently.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The markup could not be parsed.
    #[error("Malformed document at byte {position}: {message}")]
    Malformed { position: u64, message: String },

    /// The document contains no root element at all.
    #[error("Document has no root element")]
    MissingRoot,

    /// The document ended while elements were still open.
    #[error("Unexpected end of document: {0} element(s) left open")]
    Truncated(usize),

    /// The document could not be read.
    #[error("Failed to read document: {0}")]
    Io(#[from] std::io::Error),

    /// A metric key was not recognized.
    #[error("Unknown metric: {0}")]
    UnknownMetric(String),
}

/// Result type alias using pulsebook-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;

//! Error types for paraflow.

use thiserror::Error;

/// Result type alias for paraflow operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for paraflow operations.
///
/// Most variants signal a caller bug (an offset or index that does not exist in
/// the buffer). Malformed persisted paragraph data is never an error; it is
/// repaired on load.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Character offset past the end of the text.
    #[error("offset {offset} out of bounds for text of {len} chars")]
    OffsetOutOfBounds { offset: usize, len: usize },

    /// Character span that is reversed or extends past the end of the text.
    #[error("invalid range {start}..{end} for text of {len} chars")]
    InvalidRange { start: usize, end: usize, len: usize },

    /// Paragraph index that does not exist in the store.
    #[error("paragraph {index} out of bounds ({count} paragraphs)")]
    ParagraphOutOfBounds { index: usize, count: usize },

    /// Line height that is not a positive finite number.
    #[error("invalid line height: {0}")]
    InvalidLineHeight(f64),

    /// Visual line from a wrap engine that cannot be mapped onto paragraphs.
    #[error("invalid visual line {index}: {reason}")]
    InvalidLineRange { index: usize, reason: &'static str },

    /// Document could not be read or written as JSON.
    #[error("document JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

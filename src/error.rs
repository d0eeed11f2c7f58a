//! Error types for the conformance checker.
//!
//! Two kinds of failure leave the checker: a [`ConformanceError`] when the
//! document breaks a rule of the active PDF/A level, and everything else
//! (malformed content streams, dangling references, undecodable streams) which
//! says nothing about conformance and only means the check could not finish.

use crate::compliance::ConformanceError;

/// Result type alias for checker operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while checking a document.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The document violates a rule of the active conformance level.
    #[error("{0}")]
    Conformance(ConformanceError),

    /// Parse error at specific byte offset
    #[error("Failed to parse content at byte {offset}: {reason}")]
    ParseError {
        /// Byte offset where error occurred
        offset: usize,
        /// Reason for parse failure
        reason: String,
    },

    /// Referenced object not found in the document
    #[error("Object not found: {0} {1} R")]
    ObjectNotFound(u32, u16),

    /// Object has wrong type
    #[error("Invalid object type: expected {expected}, found {found}")]
    InvalidObjectType {
        /// Expected object type
        expected: String,
        /// Actual object type found
        found: String,
    },

    /// Invalid PDF structure (generic)
    #[error("Invalid PDF: {0}")]
    InvalidPdf(String),

    /// Stream decoding error
    #[error("Stream decoding error: {0}")]
    Decode(String),

    /// Unsupported stream filter
    #[error("Unsupported filter: {0}")]
    UnsupportedFilter(String),

    /// Circular reference detected in object graph
    #[error("Circular reference detected: object {0}")]
    CircularReference(crate::object::ObjectRef),

    /// Recursion depth limit exceeded
    #[error("Recursion depth limit exceeded (max: {0})")]
    RecursionLimitExceeded(u32),

    /// Malformed JSON document fixture
    #[error("Invalid document fixture: {0}")]
    Fixture(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// The conformance failure carried by this error, if any.
    pub fn as_conformance(&self) -> Option<&ConformanceError> {
        match self {
            Error::Conformance(e) => Some(e),
            _ => None,
        }
    }

    /// Whether this error reports a rule violation rather than a processing failure.
    pub fn is_conformance(&self) -> bool {
        self.as_conformance().is_some()
    }
}

impl From<ConformanceError> for Error {
    fn from(err: ConformanceError) -> Self {
        Error::Conformance(err)
    }
}

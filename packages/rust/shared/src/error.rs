//! Error types for gatecalc.
//!
//! Library crates use [`GateCalcError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all gatecalc operations.
#[derive(Debug, thiserror::Error)]
pub enum GateCalcError {
    /// No valid answer-key rows were found; the run cannot proceed.
    #[error("answer key is empty: no table with a \"Q. No.\" / \"Q. Type\" header yielded rows")]
    EmptyKey,

    /// The response document has fewer questions than the answer key.
    #[error(
        "response sheet has only {responses} questions, but answer key has {expected}"
    )]
    InsufficientResponses { responses: usize, expected: usize },

    /// No question anchors could be located in the response document.
    #[error("could not parse response sheet questions: {reason}")]
    UnparseableResponseDocument { reason: String },

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Network/HTTP error while retrieving a document.
    #[error("network error: {0}")]
    Network(String),

    /// Document decoding error (PDF structure, unsupported format, etc.).
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Invalid user-supplied input (unknown extension, malformed URL, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, GateCalcError>;

impl GateCalcError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Signal that a response document had no recognizable question anchors.
    pub fn unparseable_response(reason: impl Into<String>) -> Self {
        Self::UnparseableResponseDocument {
            reason: reason.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

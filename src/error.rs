//! Error types for the Glaive library.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`GlaiveError`] enum. Highlighting distinguishes two families of failure:
//!
//! - configuration errors ([`GlaiveError::Highlight`]): the index or the
//!   highlighter is set up in a way that makes highlighting impossible, for
//!   example a field indexed without character offsets;
//! - argument errors ([`GlaiveError::InvalidArgument`]): the call itself is
//!   malformed, for example mismatched field and passage-count arrays.
//!
//! Both abort the whole call; no partial result is produced.
//!
//! # Examples
//!
//! ```
//! use glaive::error::{GlaiveError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(GlaiveError::invalid_argument("fields must not be empty"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Glaive operations.
#[derive(Error, Debug)]
pub enum GlaiveError {
    /// I/O errors (reading document files, writing output)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Index-related errors
    #[error("Index error: {0}")]
    Index(String),

    /// Analysis-related errors (tokenization, filtering, etc.)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Query-related errors (parsing, rewriting, etc.)
    #[error("Query error: {0}")]
    Query(String),

    /// Highlighting configuration errors
    #[error("Highlight error: {0}")]
    Highlight(String),

    /// Malformed call arguments
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with GlaiveError.
pub type Result<T> = std::result::Result<T, GlaiveError>;

impl GlaiveError {
    /// Create a new index error.
    pub fn index<S: Into<String>>(msg: S) -> Self {
        GlaiveError::Index(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        GlaiveError::Analysis(msg.into())
    }

    /// Create a new query error.
    pub fn query<S: Into<String>>(msg: S) -> Self {
        GlaiveError::Query(msg.into())
    }

    /// Create a new parse error.
    pub fn parse<S: Into<String>>(msg: S) -> Self {
        GlaiveError::Query(format!("Parse error: {}", msg.into()))
    }

    /// Create a new highlight configuration error.
    pub fn highlight<S: Into<String>>(msg: S) -> Self {
        GlaiveError::Highlight(msg.into())
    }

    /// The error raised when a field carries no character offsets.
    pub fn offsets_not_indexed(field: &str) -> Self {
        GlaiveError::Highlight(format!(
            "field '{field}' was indexed without offsets, cannot highlight"
        ))
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        GlaiveError::InvalidArgument(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        GlaiveError::Other(msg.into())
    }

    /// Whether this error reports a highlighting setup mistake.
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, GlaiveError::Highlight(_))
    }
}

//! Source Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A source error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for source operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// User input is neither a work ID nor an AO3 work URL.
    #[display("must provide an AO3 work URL or ID, got: {_0}")]
    InvalidWorkReference(#[error(not(source))] String),
    /// The page is not an AO3 work page (login wall for restricted works,
    /// maintenance page, etc).
    #[display("not an AO3 work page")]
    InvalidDocument,
    /// A required field could not be found in the document.
    #[display("missing required field: {_0}")]
    MissingField(#[error(not(source))] &'static str),
    /// A field was found but could not be parsed.
    #[display("failed to parse field '{field}', found value: {value}")]
    ParseError {
        /// The field that failed to parse.
        field: &'static str,
        /// Details about the parsing failure.
        value: String,
    },
    /// AO3 has no work with this ID (or it was deleted).
    #[display("work {_0} not found")]
    WorkNotFound(#[error(not(source))] u64),
    #[display("rate limited by AO3, try again later")]
    RateLimited,
    /// Connection failures, timeouts, unexpected status codes.
    #[display("HTTP error: {_0}")]
    Http(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Retrying is left to the operator; nothing in this crate loops.
        matches!(self, Self::RateLimited | Self::Http(_))
    }
}

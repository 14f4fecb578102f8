//! Library Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use fictrack_metadata::error::Error as MetadataError;
use fictrack_source::error::{Error as SourceError, ErrorKind as SourceErrorKind};
use std::io::Error as IoError;
use std::path::PathBuf;

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of a library failure.
///
/// ### Operational Errors
/// - [`ErrorKind::InvalidRoot`]
/// - [`ErrorKind::UnknownWork`]
///
/// ### Dependency Errors
/// - [`ErrorKind::Source`]
/// - [`ErrorKind::Metadata`]
/// - [`ErrorKind::Io`]
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The library root exists but is not a directory.
    #[display("invalid library directory: {}", _0.display())]
    InvalidRoot(#[error(not(source))] PathBuf),
    /// Nothing in the library matches the given index or work reference.
    #[display("no work matching `{_0}` in the library")]
    UnknownWork(#[error(not(source))] String),
    /// Fetching from the remote source failed.
    #[display("{_0}")]
    Source(SourceErrorKind),
    /// Reading or writing a metadata record (or work file) failed.
    #[display("{_0}")]
    Metadata(#[error(not(source))] String),
    #[display("I/O error: {_0}")]
    Io(IoError),
}
impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}
impl ErrorKind {
    /// Convert a source error into a library error, preserving the source
    /// crate's `Exn` frame as a child in its own error tree.
    #[track_caller]
    pub fn from_source(err: SourceError) -> Error {
        let inner = (*err).clone();
        err.raise(ErrorKind::Source(inner))
    }

    /// Convert a metadata error into a library error, preserving the
    /// metadata crate's `Exn` frame as a child in its own error tree.
    #[track_caller]
    pub fn from_metadata(err: MetadataError) -> Error {
        let message = (*err).to_string();
        err.raise(ErrorKind::Metadata(message))
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Source(inner) => inner.is_retryable(),
            Self::Io(_) => true,
            _ => false,
        }
    }
}

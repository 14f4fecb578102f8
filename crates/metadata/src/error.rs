//! Metadata Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::io::Error as IoError;
use std::path::{Path, PathBuf};

/// A metadata error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for metadata operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
/// [`NotFound`](Self::NotFound), [`Parse`](Self::Parse),
/// [`Timestamp`](Self::Timestamp) and [`Validation`](Self::Validation) are all
/// recoverable: treat the work as new, or ask the operator again.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// No metadata file exists; the work has never been downloaded.
    #[display("metadata not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// Access denied while reading or replacing a file.
    #[display("permission denied: {}", _0.display())]
    PermissionDenied(#[error(not(source))] PathBuf),
    /// Underlying I/O error
    #[display("I/O error: {_0}")]
    Io(IoError),
    /// The metadata file exists but is not a valid record.
    #[display("invalid metadata file {}: {reason}", path.display())]
    Parse {
        /// Location of the offending file.
        path: PathBuf,
        /// What the deserializer complained about.
        reason: String,
    },
    /// A record could not be serialized.
    #[display("failed to serialize metadata record")]
    Serialize,
    /// A stored timestamp does not match the fixed timestamp format.
    #[display("invalid timestamp: {_0}")]
    Timestamp(#[error(not(source))] String),
    /// Chapters-read value outside `0..=published`.
    #[display("cannot mark {requested} chapters read, only {published} published")]
    Validation {
        /// The value the operator asked for.
        requested: u32,
        /// Chapters published at the time.
        published: u32,
    },
}
impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_))
    }

    pub(crate) fn from_io(e: IoError, path: &Path) -> Self {
        match e.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io(e),
        }
    }
}

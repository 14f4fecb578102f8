use derive_more::{Display, Error};
use fictrack_config::error::{Error as ConfigError, ErrorKind as ConfigErrorKind};
use fictrack_library::error::Error as LibraryError;
use fictrack_source::error::{Error as SourceError, ErrorKind as SourceErrorKind};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("failed to initialise logging: {_0}")]
    Logging(#[error(not(source))] String),
    #[display("{_0}")]
    Config(ConfigErrorKind),
    #[display("{_0}")]
    Source(SourceErrorKind),
    #[display("{_0}")]
    Library(#[error(not(source))] String),
    /// The work has no readable metadata record yet.
    #[display("no metadata for `{_0}`, update it first")]
    MissingMetadata(#[error(not(source))] String),
    #[display("{failed} of {total} works failed to update")]
    UpdateFailed { failed: usize, total: usize },
}
impl ErrorKind {
    #[track_caller]
    pub fn from_config(err: ConfigError) -> Error {
        let inner = (*err).clone();
        err.raise(ErrorKind::Config(inner))
    }

    #[track_caller]
    pub fn from_source(err: SourceError) -> Error {
        let inner = (*err).clone();
        err.raise(ErrorKind::Source(inner))
    }

    #[track_caller]
    pub fn from_library(err: LibraryError) -> Error {
        let message = (*err).to_string();
        err.raise(ErrorKind::Library(message))
    }
}

//! Durable storage of one [`MetadataRecord`] per work directory.
//!
//! The record always lives at [`METADATA_FILENAME`] inside the work directory.
//! Writes never modify that file in place: the new contents go to a uniquely
//! named temporary file next to it, which is then renamed over the original.
//! A crash at any point leaves either the complete old file or the complete new
//! one (plus, at worst, an orphaned temporary file that nothing reads).

use crate::error::{ErrorKind, Result};
use crate::record::MetadataRecord;
use exn::ResultExt;
use std::fs;
use std::io::{ErrorKind as IoErrorKind, Write};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use tempfile::{Builder as TempBuilder, NamedTempFile, PersistError};
use tracing::instrument;

/// Hidden, fixed filename of the metadata record inside a work directory.
pub const METADATA_FILENAME: &str = ".ao3_track_cli_metadata.json";
const TEMP_PREFIX: &str = "fictrack-";
const TEMP_SUFFIX: &str = ".tmp";

/// What [`load`] found in a work directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stored {
    /// No metadata file: the work is new to this library.
    Absent,
    /// A metadata file exists but isn't a valid record. Carries the reason.
    Malformed(String),
    Present(MetadataRecord),
}
impl Stored {
    pub fn record(&self) -> Option<&MetadataRecord> {
        match self {
            Self::Present(record) => Some(record),
            Self::Absent | Self::Malformed(_) => None,
        }
    }

    pub fn into_record(self) -> Option<MetadataRecord> {
        match self {
            Self::Present(record) => Some(record),
            Self::Absent | Self::Malformed(_) => None,
        }
    }
}

pub fn metadata_path(work_dir: impl AsRef<Path>) -> PathBuf {
    work_dir.as_ref().join(METADATA_FILENAME)
}

/// Reads the record stored in `work_dir`.
///
/// # Errors
/// - [`ErrorKind::NotFound`] if there is no metadata file,
/// - [`ErrorKind::Parse`] if there is one but it isn't exactly a record,
/// - [`ErrorKind::PermissionDenied`] or [`ErrorKind::Io`] otherwise.
#[instrument(level = "debug", skip_all, fields(work_dir = %work_dir.as_ref().display()))]
pub fn read(work_dir: impl AsRef<Path>) -> Result<MetadataRecord> {
    let path = metadata_path(work_dir);
    let contents = fs::read(&path).map_err(|e| ErrorKind::from_io(e, &path))?;
    let record = serde_json::from_slice::<MetadataRecord>(&contents).map_err(|e| ErrorKind::Parse {
        path: path.clone(),
        reason: e.to_string(),
    })?;
    Ok(record)
}

/// Same as [`read`], but the two expected failure modes come back as
/// [`Stored`] variants. Only genuine I/O failures are errors.
pub fn load(work_dir: impl AsRef<Path>) -> Result<Stored> {
    match read(work_dir) {
        Ok(record) => Ok(Stored::Present(record)),
        Err(e) => match e.deref() {
            ErrorKind::NotFound(_) => Ok(Stored::Absent),
            ErrorKind::Parse { reason, .. } => Ok(Stored::Malformed(reason.clone())),
            _ => Err(e),
        },
    }
}

/// Replaces the record stored in `work_dir` with `record`, atomically.
#[instrument(skip_all, fields(work_dir = %work_dir.as_ref().display(), work_id = record.work_id))]
pub fn write(work_dir: impl AsRef<Path>, record: &MetadataRecord) -> Result<()> {
    let json = serde_json::to_vec(record).or_raise(|| ErrorKind::Serialize)?;
    write_atomic(metadata_path(work_dir), &json)?;
    tracing::debug!("Metadata record written");
    Ok(())
}

/// Writes `contents` to `target` via a temporary file in the same directory
/// followed by a rename, so `target` is never observed half-written.
///
/// The parent directory must already exist.
pub fn write_atomic(target: impl AsRef<Path>, contents: &[u8]) -> Result<()> {
    write_atomic_with(target.as_ref(), contents, |file, target| file.persist(target).map(drop))
}

/// [`write_atomic`] with the final rename supplied by the caller.
fn write_atomic_with<P>(target: &Path, contents: &[u8], persist: P) -> Result<()>
where
    P: Fn(NamedTempFile, &Path) -> std::result::Result<(), PersistError>,
{
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = TempBuilder::new()
        .prefix(TEMP_PREFIX)
        .suffix(TEMP_SUFFIX)
        .tempfile_in(dir)
        .map_err(|e| ErrorKind::from_io(e, dir))?;
    tmp.write_all(contents).map_err(ErrorKind::Io)?;
    tmp.as_file().sync_all().map_err(ErrorKind::Io)?;

    if let Err(PersistError { error, file }) = persist(tmp, target) {
        // Some filesystems refuse to rename over an existing (hidden) file.
        // Only then is it worth sacrificing the old copy.
        let refused = matches!(error.kind(), IoErrorKind::AlreadyExists | IoErrorKind::PermissionDenied);
        if !refused || !target.exists() {
            exn::bail!(ErrorKind::from_io(error, target));
        }
        tracing::debug!(path = %target.display(), %error, "Rename over existing file refused; removing stale copy first");
        match fs::remove_file(target) {
            Ok(()) => {},
            Err(e) if e.kind() == IoErrorKind::NotFound => {},
            Err(e) => exn::bail!(ErrorKind::from_io(e, target)),
        }
        persist(file, target).map_err(|e| ErrorKind::from_io(e.error, target))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::io::Error as IoError;

    /// Renames like a filesystem that won't replace an existing file: refuses
    /// with `kind` while the target exists.
    fn refusing(kind: IoErrorKind, calls: &Cell<usize>) -> impl Fn(NamedTempFile, &Path) -> std::result::Result<(), PersistError> + '_ {
        move |file, target| {
            calls.set(calls.get() + 1);
            if target.exists() {
                return Err(PersistError { error: IoError::from(kind), file });
            }
            file.persist(target).map(drop)
        }
    }

    fn record() -> MetadataRecord {
        MetadataRecord {
            date_updated: "2024-01-01T00:00:00".to_string(),
            work_id: 21990778,
            chapters_published: 1,
            chapters_expected: Some(10),
            chapters_read: 0,
        }
    }

    fn directory_listing(dir: &Path) -> Vec<String> {
        let mut names: Vec<_> = fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_read_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = read(temp_dir.path()).unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(p) if p == &temp_dir.path().join(METADATA_FILENAME)));
        assert_eq!(load(temp_dir.path()).unwrap(), Stored::Absent);
    }

    #[test]
    fn test_read_missing_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = read(temp_dir.path().join("nope")).unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[test]
    fn test_write_then_read() {
        let temp_dir = tempfile::tempdir().unwrap();
        write(temp_dir.path(), &record()).unwrap();
        assert_eq!(read(temp_dir.path()).unwrap(), record());
        assert_eq!(load(temp_dir.path()).unwrap(), Stored::Present(record()));
        // Nothing but the record itself is left behind.
        assert_eq!(directory_listing(temp_dir.path()), vec![METADATA_FILENAME.to_string()]);
    }

    #[test]
    fn test_write_replaces_wholesale() {
        let temp_dir = tempfile::tempdir().unwrap();
        let first = MetadataRecord {
            chapters_read: 1,
            ..record()
        };
        write(temp_dir.path(), &first).unwrap();
        let second = MetadataRecord {
            date_updated: "2024-02-01T00:00:00".to_string(),
            chapters_published: 2,
            chapters_expected: None,
            ..record()
        };
        write(temp_dir.path(), &second).unwrap();
        assert_eq!(read(temp_dir.path()).unwrap(), second);
        assert_eq!(directory_listing(temp_dir.path()), vec![METADATA_FILENAME.to_string()]);
    }

    #[test]
    fn test_interrupted_write_keeps_old_record() {
        let temp_dir = tempfile::tempdir().unwrap();
        write(temp_dir.path(), &record()).unwrap();
        // Simulate a process killed after writing part of the new record but
        // before the rename: a partial temp file is left next to the target.
        let mut partial = TempBuilder::new().prefix(TEMP_PREFIX).suffix(TEMP_SUFFIX).tempfile_in(temp_dir.path()).unwrap();
        partial.write_all(br#"{"date_updated":"2024-02-01T00:00:00","work_id":2199"#).unwrap();
        let orphan = partial.into_temp_path().keep().unwrap();
        assert!(orphan.exists());
        assert_eq!(read(temp_dir.path()).unwrap(), record());
        // The next successful write goes through regardless of the orphan.
        let newer = MetadataRecord {
            chapters_published: 2,
            ..record()
        };
        write(temp_dir.path(), &newer).unwrap();
        assert_eq!(read(temp_dir.path()).unwrap(), newer);
    }

    #[test]
    fn test_read_invalid_json() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join(METADATA_FILENAME), b"{not json").unwrap();
        let err = read(temp_dir.path()).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Parse { .. }));
        assert!(matches!(load(temp_dir.path()).unwrap(), Stored::Malformed(_)));
    }

    #[test]
    fn test_read_outdated_shape() {
        let temp_dir = tempfile::tempdir().unwrap();
        // An older file from before `chapters_expected` was tracked.
        fs::write(
            temp_dir.path().join(METADATA_FILENAME),
            br#"{"date_updated": "2022-03-04T00:00:00", "work_id": 5, "chapters_published": 2}"#,
        )
        .unwrap();
        match load(temp_dir.path()).unwrap() {
            Stored::Malformed(reason) => assert!(reason.contains("chapters_expected")),
            other => panic!("expected malformed record, got {other:?}"),
        }
    }

    #[test]
    fn test_read_invalid_utf8() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join(METADATA_FILENAME), [0xff, 0xfe, 0x00]).unwrap();
        assert!(matches!(load(temp_dir.path()).unwrap(), Stored::Malformed(_)));
    }

    #[test]
    fn test_read_accepts_python_style_whitespace() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(
            temp_dir.path().join(METADATA_FILENAME),
            br#"{"date_updated": "2024-01-01T00:00:00", "work_id": 21990778, "chapters_published": 1, "chapters_expected": 10, "chapters_read": 0}"#,
        )
        .unwrap();
        assert_eq!(read(temp_dir.path()).unwrap(), record());
    }

    #[test]
    fn test_write_atomic_missing_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = write_atomic(temp_dir.path().join("missing/work.html"), b"data").unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[test]
    fn test_write_atomic_arbitrary_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let target = temp_dir.path().join("work.html");
        write_atomic(&target, b"<html>old</html>").unwrap();
        write_atomic(&target, b"<html>new</html>").unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"<html>new</html>");
        assert_eq!(directory_listing(temp_dir.path()), vec!["work.html".to_string()]);
    }

    #[test]
    fn test_stored_accessors() {
        assert_eq!(Stored::Present(record()).record(), Some(&record()));
        assert_eq!(Stored::Absent.record(), None);
        assert_eq!(Stored::Malformed("x".into()).into_record(), None);
        assert_eq!(Stored::Present(record()).into_record(), Some(record()));
    }

    #[rstest::rstest]
    #[case(IoErrorKind::AlreadyExists)]
    #[case(IoErrorKind::PermissionDenied)]
    fn test_write_atomic_replaces_after_refused_rename(#[case] kind: IoErrorKind) {
        let temp_dir = tempfile::tempdir().unwrap();
        let target = temp_dir.path().join(METADATA_FILENAME);
        fs::write(&target, b"old").unwrap();
        let calls = Cell::new(0);
        write_atomic_with(&target, b"new", refusing(kind, &calls)).unwrap();
        assert_eq!(calls.get(), 2);
        assert_eq!(fs::read(&target).unwrap(), b"new");
        assert_eq!(directory_listing(temp_dir.path()), vec![METADATA_FILENAME.to_string()]);
    }

    #[test]
    fn test_write_atomic_other_rename_failures_keep_target() {
        let temp_dir = tempfile::tempdir().unwrap();
        let target = temp_dir.path().join(METADATA_FILENAME);
        fs::write(&target, b"old").unwrap();
        let calls = Cell::new(0);
        let err = write_atomic_with(&target, b"new", refusing(IoErrorKind::Other, &calls)).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Io(_)));
        assert_eq!(calls.get(), 1);
        assert_eq!(fs::read(&target).unwrap(), b"old");
        // The temporary file is cleaned up when dropped.
        assert_eq!(directory_listing(temp_dir.path()), vec![METADATA_FILENAME.to_string()]);
    }
}

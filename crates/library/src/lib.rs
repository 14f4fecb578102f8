//! The on-disk library: one directory per tracked work, named
//! `"<title> <work id>"`, holding the downloaded work and its metadata record.
//!
//! ```text
//! library/
//! ├── The Long Way Round 21990778/
//! │   ├── .ao3_track_cli_metadata.json
//! │   └── work.html
//! └── Another Work 123/
//!     └── ...
//! ```

pub mod error;
#[cfg(test)]
mod mock;
mod naming;
mod update;

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use fictrack_metadata::error::ErrorKind as MetadataErrorKind;
use fictrack_metadata::{MetadataRecord, Stored, store};
use fictrack_source::parse_work_id;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::instrument;

pub use crate::naming::{sanitize_title, split_work_dir_name, work_dir_name};
pub use crate::update::Update;

/// File name of the downloaded work inside its directory.
pub const WORK_FILENAME: &str = "work.html";

/// A single work directory in the library.
#[derive(Debug)]
pub struct Entry {
    /// Position in the (name-sorted) listing; what users type to select it.
    pub index: usize,
    pub path: PathBuf,
    /// Directory name without the trailing work ID.
    pub name: String,
    /// From the directory name, or failing that the stored record.
    pub work_id: Option<u64>,
    pub stored: Stored,
}

pub struct Library {
    root: PathBuf,
}
impl Library {
    /// Opens the library at `root`, creating the directory when it doesn't
    /// exist yet.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if root.exists() && !root.is_dir() {
            exn::bail!(ErrorKind::InvalidRoot(root));
        }
        fs::create_dir_all(&root).or_raise(|| ErrorKind::InvalidRoot(root.clone()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every work directory in the library, sorted by directory name.
    ///
    /// Plain files and hidden directories are ignored. Metadata problems,
    /// including metadata that can't be read at all, are reported per entry
    /// through [`Entry::stored`] instead of failing the whole listing.
    #[instrument(skip(self), fields(root = %self.root.display()))]
    pub fn entries(&self) -> Result<Vec<Entry>> {
        let mut dirs = Vec::new();
        for dir_entry in fs::read_dir(&self.root).map_err(ErrorKind::Io)? {
            let dir_entry = dir_entry.map_err(ErrorKind::Io)?;
            if !dir_entry.file_type().map_err(ErrorKind::Io)?.is_dir() {
                continue;
            }
            let Ok(dir_name) = dir_entry.file_name().into_string() else {
                tracing::warn!(path = %dir_entry.path().display(), "Skipping directory with a non UTF-8 name");
                continue;
            };
            if dir_name.starts_with('.') {
                continue;
            }
            dirs.push((dir_name, dir_entry.path()));
        }
        dirs.sort();

        let entries = dirs
            .into_iter()
            .enumerate()
            .map(|(index, (dir_name, path))| {
                let stored = load_entry(&path);
                let (name, work_id) = split_work_dir_name(&dir_name);
                let work_id = work_id.or_else(|| stored.record().map(|record| record.work_id));
                Entry { index, path, name: name.to_string(), work_id, stored }
            })
            .collect();
        Ok(entries)
    }

    /// Finds an entry by its listing index, or by work ID or work URL.
    pub fn find(&self, selector: &str) -> Result<Entry> {
        let selector = selector.trim();
        let mut entries = self.entries()?;
        if let Ok(index) = selector.parse::<usize>()
            && index < entries.len()
        {
            return Ok(entries.swap_remove(index));
        }
        if let Ok(work_id) = parse_work_id(selector)
            && let Some(position) = entries.iter().position(|entry| entry.work_id == Some(work_id))
        {
            return Ok(entries.swap_remove(position));
        }
        exn::bail!(ErrorKind::UnknownWork(selector.to_string()))
    }

    /// Directory currently holding `work_id`, if it is already tracked.
    pub fn work_dir(&self, work_id: u64) -> Result<Option<PathBuf>> {
        Ok(self.entries()?.into_iter().find(|entry| entry.work_id == Some(work_id)).map(|entry| entry.path))
    }

    /// Records that the first `chapters_read` chapters of the work in
    /// `work_dir` have been read.
    ///
    /// # Errors
    /// Fails if there is no readable record in `work_dir`, or if
    /// `chapters_read` is more than the number of published chapters.
    #[instrument(skip(self, work_dir), fields(work_dir = %work_dir.as_ref().display()))]
    pub fn mark_read(&self, work_dir: impl AsRef<Path>, chapters_read: u32) -> Result<MetadataRecord> {
        let work_dir = work_dir.as_ref();
        let record = store::read(work_dir)
            .and_then(|record| record.mark_read(chapters_read))
            .map_err(ErrorKind::from_metadata)?;
        store::write(work_dir, &record).map_err(ErrorKind::from_metadata)?;
        tracing::info!(chapters_read, "Set read chapter count");
        Ok(record)
    }
}

/// An unreadable metadata file shows up as [`Stored::Malformed`]; updating
/// that entry then fails on its own.
fn load_entry(path: &Path) -> Stored {
    match store::load(path) {
        Ok(stored) => stored,
        Err(e) => {
            let kind: &MetadataErrorKind = &e;
            tracing::warn!(path = %path.display(), error = %kind, "Unreadable metadata file");
            Stored::Malformed(kind.to_string())
        },
    }
}

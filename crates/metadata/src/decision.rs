//! Deciding whether a local copy is behind its remote work.

use crate::error::Result;
use crate::record::{MetadataRecord, format_timestamp};
use crate::store::Stored;
use crate::summary::WorkSummary;
use time::PrimitiveDateTime;
use tracing::instrument;

/// Why a work does (or doesn't) need to be downloaded again.
///
/// Every variant except [`UpToDate`](Self::UpToDate) means "download it", but
/// each reaches that conclusion differently and deserves its own message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Nothing stored locally yet.
    New,
    /// The metadata file couldn't be parsed; it will be overwritten.
    Malformed(String),
    /// The directory holds the record of another work. It will be
    /// overwritten, and none of its reading progress is kept.
    Mismatched { stored_work_id: u64 },
    /// The stored `date_updated` is unreadable; treat the work as brand new.
    InvalidTimestamp(String),
    /// The remote work was updated after the stored snapshot.
    ///
    /// `new_chapters` is passed through as-is: it may be zero (edits only) or
    /// even negative if chapters were deleted upstream.
    Outdated { new_chapters: i64 },
    UpToDate,
}
impl Decision {
    #[instrument(level = "debug", skip_all, fields(work_id = remote.work_id), ret)]
    pub fn evaluate(remote: &WorkSummary, stored: &Stored) -> Self {
        let record = match stored {
            Stored::Absent => return Self::New,
            Stored::Malformed(reason) => return Self::Malformed(reason.clone()),
            Stored::Present(record) if record.work_id != remote.work_id => {
                return Self::Mismatched { stored_work_id: record.work_id };
            },
            Stored::Present(record) => record,
        };
        let Ok(stored_at) = record.updated_at() else {
            return Self::InvalidTimestamp(record.date_updated.clone());
        };
        if remote.updated_at > stored_at {
            Self::Outdated {
                new_chapters: i64::from(remote.chapters.written) - i64::from(record.chapters_published),
            }
        } else {
            Self::UpToDate
        }
    }

    pub fn needs_update(&self) -> bool {
        !matches!(self, Self::UpToDate)
    }

    /// The stored record whose reading progress may be carried into the
    /// replacement record, if any.
    pub fn previous<'a>(&self, stored: &'a Stored) -> Option<&'a MetadataRecord> {
        match self {
            Self::Mismatched { .. } => None,
            _ => stored.record(),
        }
    }
}

/// Whether a work last updated upstream at `remote_updated_at` needs to be
/// downloaded again, given what is stored locally.
///
/// True when nothing is stored, when the stored timestamp can't be parsed, or
/// when the remote timestamp is strictly later. Equal timestamps are up to date.
pub fn needs_update(remote_updated_at: PrimitiveDateTime, stored: Option<&MetadataRecord>) -> bool {
    let Some(record) = stored else {
        return true;
    };
    match record.updated_at() {
        Ok(stored_at) => remote_updated_at > stored_at,
        Err(_) => true,
    }
}

/// Builds the full replacement record for `remote`, with no reading progress.
///
/// See [`carry_over`] to keep the previous `chapters_read`.
pub fn build_updated_record(remote: &WorkSummary) -> Result<MetadataRecord> {
    Ok(MetadataRecord {
        date_updated: format_timestamp(remote.updated_at)?,
        work_id: remote.work_id,
        chapters_published: remote.chapters.written,
        chapters_expected: remote.chapters.total,
        chapters_read: 0,
    })
}

/// Keeps the reading progress of `previous` in `record`.
///
/// Progress is clamped to the chapters now published, in case some were
/// removed upstream. Without a previous record, progress starts at zero.
pub fn carry_over(record: MetadataRecord, previous: Option<&MetadataRecord>) -> MetadataRecord {
    let chapters_read = previous.map_or(0, |p| p.chapters_read.min(record.chapters_published));
    MetadataRecord { chapters_read, ..record }
}

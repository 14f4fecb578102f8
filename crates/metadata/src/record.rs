use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use serde::{Deserialize, Deserializer, Serialize};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Duration, OffsetDateTime, PrimitiveDateTime};

/// The one textual format used for every persisted timestamp, e.g.
/// `2024-01-01T00:00:00`. Timestamps carry no offset and are treated as UTC.
pub const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

/// Incomplete works not updated for longer than this are flagged as stale.
pub const STALE_THRESHOLD: Duration = Duration::days(365);

pub fn format_timestamp(timestamp: PrimitiveDateTime) -> Result<String> {
    timestamp.format(TIMESTAMP_FORMAT).or_raise(|| ErrorKind::Timestamp(timestamp.to_string()))
}

pub fn parse_timestamp(value: &str) -> Result<PrimitiveDateTime> {
    PrimitiveDateTime::parse(value, TIMESTAMP_FORMAT).or_raise(|| ErrorKind::Timestamp(value.to_string()))
}

pub(crate) fn now() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();
    PrimitiveDateTime::new(now.date(), now.time())
}

/// Locally persisted snapshot of a work's last-known remote state, plus the
/// operator's reading progress.
///
/// Serialized as a single JSON object with exactly these keys. Unknown keys
/// are rejected and `chapters_expected` must be present (possibly `null`);
/// only `chapters_read` may be omitted, which older files do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetadataRecord {
    /// Remote "updated" time in [`TIMESTAMP_FORMAT`]. Kept as text so that a
    /// hand-edited or corrupted value surfaces as its own condition instead of
    /// failing the whole file.
    pub date_updated: String,
    pub work_id: u64,
    pub chapters_published: u32,
    #[serde(deserialize_with = "required_nullable")]
    pub chapters_expected: Option<u32>,
    #[serde(default)]
    pub chapters_read: u32,
}

// Using `deserialize_with` turns off serde's implicit "missing Option means
// None" behaviour, so the key itself stays mandatory.
fn required_nullable<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<u32>, D::Error> {
    Option::<u32>::deserialize(deserializer)
}

impl MetadataRecord {
    /// Parses [`date_updated`](Self::date_updated).
    pub fn updated_at(&self) -> Result<PrimitiveDateTime> {
        parse_timestamp(&self.date_updated)
    }

    /// `read/published/expected`, with `?` standing in for an unknown total.
    pub fn chapter_count_str(&self) -> String {
        match self.chapters_expected {
            Some(expected) => format!("{}/{}/{expected}", self.chapters_read, self.chapters_published),
            None => format!("{}/{}/?", self.chapters_read, self.chapters_published),
        }
    }

    pub fn is_stale(&self) -> bool {
        self.is_stale_at(now())
    }

    /// Whether the work looks abandoned as of `now`: still incomplete and not
    /// updated for more than [`STALE_THRESHOLD`].
    ///
    /// An unreadable `date_updated` counts as stale; it needs attention either way.
    pub fn is_stale_at(&self, now: PrimitiveDateTime) -> bool {
        if Some(self.chapters_published) == self.chapters_expected {
            return false;
        }
        match self.updated_at() {
            Ok(updated_at) => now - updated_at > STALE_THRESHOLD,
            Err(e) => {
                let kind: &ErrorKind = &e;
                tracing::warn!(work_id = self.work_id, error = %kind, "Unreadable update timestamp; flagging as stale");
                true
            },
        }
    }

    /// Returns a copy with only `chapters_read` changed.
    ///
    /// # Errors
    /// [`ErrorKind::Validation`] when `chapters_read` exceeds the number of
    /// published chapters.
    pub fn mark_read(&self, chapters_read: u32) -> Result<Self> {
        if chapters_read > self.chapters_published {
            exn::bail!(ErrorKind::Validation {
                requested: chapters_read,
                published: self.chapters_published,
            });
        }
        Ok(Self { chapters_read, ..self.clone() })
    }
}

use std::fmt::{Display, Formatter, Result as FmtResult};
use time::PrimitiveDateTime;

/// Chapter counts as shown on a work page: `written/total`, where AO3 prints
/// `?` for an unknown total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chapters {
    pub written: u32,
    pub total: Option<u32>,
}
impl Chapters {
    pub fn new(written: u32, total: Option<u32>) -> Self {
        Self { written, total }
    }
}
impl Display for Chapters {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self.total {
            Some(total) => write!(f, "{}/{total}", self.written),
            None => write!(f, "{}/?", self.written),
        }
    }
}

/// Freshly fetched state of a remote work.
///
/// Produced by a source (see `fictrack-source`) and consumed by
/// [`Decision::evaluate`](crate::Decision::evaluate) and
/// [`build_updated_record`](crate::build_updated_record). Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkSummary {
    /// AO3 Work ID
    pub work_id: u64,
    pub title: String,
    /// Author pseuds (empty for anonymous/orphaned works)
    pub authors: Vec<String>,
    pub chapters: Chapters,
    pub words: u64,
    /// When the work was last updated upstream. AO3 only reports dates, so
    /// this is usually midnight.
    pub updated_at: PrimitiveDateTime,
}

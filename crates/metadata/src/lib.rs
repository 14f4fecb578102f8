//! Per-work metadata records and the decision of when to re-download a work.
//!
//! - [`store`] persists one [`MetadataRecord`] per work directory, atomically,
//!   and distinguishes "nothing stored" from "something broken stored".
//! - [`Decision`] compares a freshly fetched [`WorkSummary`] against what is
//!   stored and says whether (and why) the work has to be downloaded again.
//!
//! Neither performs network or terminal I/O.

mod decision;
pub mod error;
mod record;
pub mod store;
mod summary;

pub use crate::decision::{Decision, build_updated_record, carry_over, needs_update};
pub use crate::record::{
    MetadataRecord, STALE_THRESHOLD, TIMESTAMP_FORMAT, format_timestamp, parse_timestamp,
};
pub use crate::store::Stored;
pub use crate::summary::{Chapters, WorkSummary};

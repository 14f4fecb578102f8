mod client;
mod consts;
pub mod error;
mod extract;
mod id;

use fictrack_metadata::WorkSummary;

pub use crate::client::{Ao3Client, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
use crate::error::Result;
pub use crate::extract::{Extractor, extract_summary};
pub use crate::id::parse_work_id;

/// Where works come from.
///
/// [`Ao3Client`] is the real implementation; tests substitute their own.
pub trait Source {
    /// Fetches the current metadata of a work.
    fn summary(&self, work_id: u64) -> Result<WorkSummary>;

    /// Fetches the full work as a single HTML document.
    fn download(&self, work_id: u64) -> Result<Vec<u8>>;
}

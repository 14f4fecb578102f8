//! Blocking HTTP client for archiveofourown.org.

use crate::Source;
use crate::error::{ErrorKind, Result};
use crate::extract::extract_summary;
use exn::ResultExt;
use fictrack_metadata::WorkSummary;
use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use std::time::Duration;
use tracing::instrument;

pub const DEFAULT_BASE_URL: &str = "https://archiveofourown.org";
pub const DEFAULT_USER_AGENT: &str = concat!("fictrack/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// [`Source`] backed by AO3 itself (or anything serving the same paths under
/// `base_url`).
///
/// Requests are sent one at a time and never retried.
pub struct Ao3Client {
    client: Client,
    base_url: String,
}
impl Ao3Client {
    pub fn new(base_url: impl AsRef<str>, user_agent: impl AsRef<str>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent.as_ref())
            .timeout(timeout)
            .build()
            .or_raise(|| ErrorKind::Http("failed to build HTTP client".to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.as_ref().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(&self, url: &str, work_id: u64) -> Result<Response> {
        let response = self
            .client
            .get(url)
            .send()
            .or_raise(|| ErrorKind::Http(format!("request to {url} failed")))?;
        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::NOT_FOUND => exn::bail!(ErrorKind::WorkNotFound(work_id)),
            StatusCode::TOO_MANY_REQUESTS => exn::bail!(ErrorKind::RateLimited),
            status => exn::bail!(ErrorKind::Http(format!("unexpected status {status} from {url}"))),
        }
    }
}
impl Source for Ao3Client {
    #[instrument(skip(self))]
    fn summary(&self, work_id: u64) -> Result<WorkSummary> {
        // Without `view_adult`, mature/explicit works show a content warning
        // page instead of the work.
        let url = format!("{}/works/{work_id}?view_adult=true", self.base_url);
        let html = self
            .get(&url, work_id)?
            .bytes()
            .or_raise(|| ErrorKind::Http(format!("failed to read response from {url}")))?;
        let summary = extract_summary(work_id, &html)?;
        tracing::debug!(title = %summary.title, chapters = %summary.chapters, "Fetched work summary");
        Ok(summary)
    }

    #[instrument(skip(self))]
    fn download(&self, work_id: u64) -> Result<Vec<u8>> {
        // AO3 ignores the filename segment; only the ID and extension matter.
        let url = format!("{}/downloads/{work_id}/{work_id}.html", self.base_url);
        let bytes = self
            .get(&url, work_id)?
            .bytes()
            .or_raise(|| ErrorKind::Http(format!("failed to read response from {url}")))?;
        tracing::debug!(size = bytes.len(), "Downloaded work");
        Ok(bytes.to_vec())
    }
}

use fictrack_metadata::{Chapters, WorkSummary};
use fictrack_source::Source;
use fictrack_source::error::{ErrorKind, Result};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use time::PrimitiveDateTime;

/// In-memory [`Source`] for tests.
#[derive(Default)]
pub(crate) struct MockSource {
    works: RefCell<HashMap<u64, WorkSummary>>,
    failing_downloads: RefCell<Vec<u64>>,
    downloads: Cell<usize>,
}
impl MockSource {
    pub(crate) fn publish(&self, work_id: u64, title: &str, written: u32, updated_at: PrimitiveDateTime) {
        let summary = WorkSummary {
            work_id,
            title: title.to_string(),
            authors: vec!["someone".to_string()],
            chapters: Chapters::new(written, None),
            words: 1000 * u64::from(written),
            updated_at,
        };
        self.works.borrow_mut().insert(work_id, summary);
    }

    pub(crate) fn fail_downloads_of(&self, work_id: u64) {
        self.failing_downloads.borrow_mut().push(work_id);
    }

    pub(crate) fn downloads(&self) -> usize {
        self.downloads.get()
    }
}
impl Source for MockSource {
    fn summary(&self, work_id: u64) -> Result<WorkSummary> {
        match self.works.borrow().get(&work_id) {
            Some(summary) => Ok(summary.clone()),
            None => exn::bail!(ErrorKind::WorkNotFound(work_id)),
        }
    }

    fn download(&self, work_id: u64) -> Result<Vec<u8>> {
        if self.failing_downloads.borrow().contains(&work_id) {
            exn::bail!(ErrorKind::RateLimited);
        }
        let works = self.works.borrow();
        let Some(summary) = works.get(&work_id) else {
            exn::bail!(ErrorKind::WorkNotFound(work_id));
        };
        self.downloads.set(self.downloads.get() + 1);
        Ok(format!("<h1>{}</h1><p>{} chapters</p>", summary.title, summary.chapters).into_bytes())
    }
}

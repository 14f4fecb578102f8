use crate::error::{ErrorKind, Result};
use crate::{Entry, Library, WORK_FILENAME, work_dir_name};
use fictrack_metadata::{Decision, build_updated_record, carry_over, store};
use fictrack_source::Source;
use std::fs;
use std::path::PathBuf;
use tracing::instrument;

/// The outcome of (successfully) updating a single work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    pub work_id: u64,
    /// Title as currently published.
    pub title: String,
    pub work_dir: PathBuf,
    pub decision: Decision,
    /// `false` when the work was already up to date and the update wasn't
    /// forced.
    pub downloaded: bool,
}

impl Library {
    /// Brings the local copy of `work_id` up to date with `source`.
    ///
    /// Works that are already tracked keep their existing directory (even when
    /// the title has changed since); new works get a directory named after
    /// their current title. The work itself is written before its metadata
    /// record, so a failure part way through leaves the old record in place
    /// and the next update tries again.
    ///
    /// With `force`, up-to-date works are downloaded anyway.
    #[instrument(skip(self, source))]
    pub fn update_work(&self, source: &dyn Source, work_id: u64, force: bool) -> Result<Update> {
        let summary = source.summary(work_id).map_err(ErrorKind::from_source)?;
        let work_dir = match self.work_dir(work_id)? {
            Some(existing) => existing,
            None => self.root.join(work_dir_name(&summary.title, work_id)),
        };
        let stored = store::load(&work_dir).map_err(ErrorKind::from_metadata)?;
        let decision = Decision::evaluate(&summary, &stored);
        let mut update = Update {
            work_id,
            title: summary.title.clone(),
            work_dir,
            decision,
            downloaded: false,
        };

        if !update.decision.needs_update() {
            if !force {
                tracing::debug!("Already up to date");
                return Ok(update);
            }
            tracing::info!("Forcing download of an up to date work");
        }

        let contents = source.download(work_id).map_err(ErrorKind::from_source)?;
        fs::create_dir_all(&update.work_dir).map_err(ErrorKind::Io)?;
        store::write_atomic(update.work_dir.join(WORK_FILENAME), &contents).map_err(ErrorKind::from_metadata)?;

        let record = build_updated_record(&summary).map_err(ErrorKind::from_metadata)?;
        let record = carry_over(record, update.decision.previous(&stored));
        store::write(&update.work_dir, &record).map_err(ErrorKind::from_metadata)?;

        tracing::info!(title = %update.title, chapters = %summary.chapters, "Downloaded work");
        update.downloaded = true;
        Ok(update)
    }

    /// Updates every work in the library, one after the other.
    ///
    /// A failure only affects its own work: every entry gets its own result.
    /// Entries without a known work ID fail with [`ErrorKind::UnknownWork`].
    #[instrument(skip(self, source))]
    pub fn update_all(&self, source: &dyn Source, force: bool) -> Result<Vec<(Entry, Result<Update>)>> {
        let entries = self.entries()?;
        tracing::info!(works = entries.len(), "Updating library");
        let results = entries
            .into_iter()
            .map(|entry| {
                let result = match entry.work_id {
                    Some(work_id) => self.update_work(source, work_id, force),
                    None => Err(exn::Exn::from(ErrorKind::UnknownWork(entry.name.clone()))),
                };
                if let Err(err) = &result {
                    let kind: &ErrorKind = err;
                    tracing::warn!(name = %entry.name, error = %kind, "Failed to update work");
                }
                (entry, result)
            })
            .collect();
        Ok(results)
    }
}

//! One function per subcommand. Results are printed to stdout; diagnostics go
//! through `tracing`.

use crate::error::{ErrorKind, Result};
use exn::OptionExt;
use fictrack_library::{Library, Update};
use fictrack_metadata::{Decision, Stored};
use fictrack_source::{Source, parse_work_id};

pub fn list(library: &Library) -> Result<()> {
    let entries = library.entries().map_err(ErrorKind::from_library)?;
    if entries.is_empty() {
        println!("  There's nothing here.");
        return Ok(());
    }
    for entry in entries {
        match &entry.stored {
            Stored::Present(record) => {
                let stale = if record.is_stale() { " (stale)" } else { "" };
                println!("  {} - {} - ({}){stale}", entry.index, entry.name, record.chapter_count_str());
            },
            Stored::Absent => tracing::warn!(name = %entry.name, "Missing metadata file, skipping"),
            Stored::Malformed(reason) => {
                tracing::warn!(name = %entry.name, %reason, "Invalid metadata file, skipping");
            },
        }
    }
    Ok(())
}

pub fn add(library: &Library, source: &dyn Source, work: &str, force: bool) -> Result<()> {
    let work_id = parse_work_id(work).map_err(ErrorKind::from_source)?;
    let update = library.update_work(source, work_id, force).map_err(ErrorKind::from_library)?;
    report(&update);
    Ok(())
}

pub fn update(library: &Library, source: &dyn Source, work: Option<&str>, force: bool) -> Result<()> {
    let Some(selector) = work else {
        return update_all(library, source, force);
    };
    let entry = library.find(selector).map_err(ErrorKind::from_library)?;
    let work_id = entry.work_id.ok_or_raise(|| ErrorKind::MissingMetadata(entry.name.clone()))?;
    let update = library.update_work(source, work_id, force).map_err(ErrorKind::from_library)?;
    report(&update);
    Ok(())
}

fn update_all(library: &Library, source: &dyn Source, force: bool) -> Result<()> {
    let results = library.update_all(source, force).map_err(ErrorKind::from_library)?;
    if results.is_empty() {
        println!("  There's nothing here.");
        return Ok(());
    }
    let total = results.len();
    let mut failed = 0;
    for (entry, result) in results {
        match result {
            Ok(update) => report(&update),
            Err(err) => {
                failed += 1;
                let kind: &fictrack_library::error::ErrorKind = &err;
                println!("Failed to update {}: {kind}", entry.name);
            },
        }
    }
    if failed > 0 {
        exn::bail!(ErrorKind::UpdateFailed { failed, total });
    }
    Ok(())
}

pub fn read(library: &Library, work: &str, chapters: Option<u32>) -> Result<()> {
    let entry = library.find(work).map_err(ErrorKind::from_library)?;
    let chapters = match (chapters, entry.stored.record()) {
        (Some(chapters), _) => chapters,
        (None, Some(record)) => record.chapters_published,
        (None, None) => exn::bail!(ErrorKind::MissingMetadata(entry.name)),
    };
    library.mark_read(&entry.path, chapters).map_err(ErrorKind::from_library)?;
    println!("Set read chapter count!");
    Ok(())
}

fn report(update: &Update) {
    println!("{}", message(update));
}

fn message(update: &Update) -> String {
    let title = &update.title;
    match &update.decision {
        Decision::New => format!("Adding new work {title}"),
        Decision::Malformed(_) => "Invalid metadata file, overwriting...".to_string(),
        Decision::Mismatched { stored_work_id } => {
            format!("Metadata file belongs to work {stored_work_id}, overwriting...")
        },
        Decision::InvalidTimestamp(_) => {
            "Error parsing metadata contents, treating this work as brand new".to_string()
        },
        Decision::Outdated { new_chapters } => {
            let plural = if *new_chapters == 1 { "" } else { "s" };
            format!("Updating {title} ({new_chapters} new chapter{plural})")
        },
        Decision::UpToDate if update.downloaded => format!("Re-downloading {title}"),
        Decision::UpToDate => format!("{title} is already up to date, skipping"),
    }
}

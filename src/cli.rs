use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "fictrack", author, version, about)]
pub struct Cli {
    /// Library directory (overrides the configuration file).
    #[arg(long, global = true, value_name = "DIR")]
    pub library: Option<PathBuf>,

    /// Configuration file (TOML, YAML or JSON).
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Defaults to `list`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List tracked works with their reading progress.
    List,
    /// Download a work into the library.
    Add {
        /// AO3 work URL or numeric work ID.
        #[arg(value_name = "ID_OR_URL")]
        work: String,
        /// Download even if the local copy is up to date.
        #[arg(long)]
        force: bool,
    },
    /// Check works for updates and download the ones that changed.
    Update {
        /// Listing index, work ID or URL; every work when omitted.
        work: Option<String>,
        /// Download even if the local copy is up to date.
        #[arg(long)]
        force: bool,
    },
    /// Record how many chapters of a work have been read.
    Read {
        /// Listing index, work ID or URL.
        work: String,
        /// Defaults to every published chapter.
        chapters: Option<u32>,
    },
}

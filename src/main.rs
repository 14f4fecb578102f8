mod cli;
mod commands;
mod error;
mod logging;

use crate::cli::{Cli, Command};
use crate::error::{ErrorKind, Result};
use clap::Parser as _;
use fictrack_config::Config;
use fictrack_library::Library;
use fictrack_source::Ao3Client;
use std::process::ExitCode;

fn main() -> ExitCode {
    match try_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let kind: &ErrorKind = &err;
            eprintln!("Error: {kind}");
            tracing::debug!("{err:?}");
            ExitCode::FAILURE
        },
    }
}

fn try_main() -> Result<()> {
    logging::init()?;

    let cli = Cli::parse();
    tracing::debug!(?cli, "Parsed command line");

    let mut config = Config::load(cli.config.as_deref()).map_err(ErrorKind::from_config)?;
    if let Some(library) = cli.library {
        config.library = library;
    }
    let library = Library::open(&config.library).map_err(ErrorKind::from_library)?;

    match cli.command.unwrap_or(Command::List) {
        Command::List => commands::list(&library),
        Command::Add { work, force } => commands::add(&library, &client(&config)?, &work, force),
        Command::Update { work, force } => commands::update(&library, &client(&config)?, work.as_deref(), force),
        Command::Read { work, chapters } => commands::read(&library, &work, chapters),
    }
}

fn client(config: &Config) -> Result<Ao3Client> {
    Ao3Client::new(&config.base_url, &config.user_agent, config.timeout()).map_err(ErrorKind::from_source)
}

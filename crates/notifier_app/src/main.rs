mod app;
mod config;
mod platform;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use notifier_logging::{notifier_debug, notifier_error};

use crate::app::RunOptions;
use crate::platform::paths::AppDirs;

/// Fetches the results of saved PubMed queries and notifies when new papers
/// are available.
#[derive(Parser, Debug)]
#[command(name = "pubmed-notifier", version)]
struct Cli {
    /// Config file. Default is $XDG_CONFIG_HOME/pubmednotifier/config
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Extra queries file. Default is $XDG_DATA_HOME/pubmednotifier/queries
    #[arg(short = 'f', long = "file")]
    file: Option<PathBuf>,

    /// Write the digest here instead of a timestamped file in the results path
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Disable the desktop notification
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,

    /// Echo debug logging to the terminal
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            notifier_error!("{:#}", err);
            // The logger may not be up yet when directory setup fails.
            if !log::log_enabled!(log::Level::Error) {
                eprintln!("Error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let dirs = AppDirs::discover()?;
    dirs.ensure()?;
    if let Some(segment) = platform::logging::initialize(&dirs.log_dir(), cli.verbose) {
        notifier_debug!("Logging to {:?}", segment);
    }

    let queries_path = match cli.file {
        Some(path) => path,
        None => dirs
            .ensure_queries_file()
            .context("creating the default queries file")?,
    };
    let options = RunOptions {
        config_path: cli.config.unwrap_or_else(|| dirs.config_file()),
        queries_path,
        output: cli.output,
        notify: !cli.quiet,
    };
    app::run(&dirs, &options)
}

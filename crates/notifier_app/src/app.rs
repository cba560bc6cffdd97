//! One notifier pass: configuration, fetch, digest, notification.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use notifier_core::{
    annotate_with_errors, notification_summary, render_digest, DigestOptions, DigestSection,
    RunReport,
};
use notifier_engine::{
    unique_digest_path, AtomicFileWriter, Engine, EutilsFetcher, FetchSettings, HistoryStore,
};
use notifier_logging::{notifier_error, notifier_info};

use crate::config;
use crate::platform::notify::{DesktopNotifier, Notifier};
use crate::platform::paths::AppDirs;

/// Resolved command-line choices.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub config_path: PathBuf,
    pub queries_path: PathBuf,
    pub output: Option<PathBuf>,
    pub notify: bool,
}

pub fn run(dirs: &AppDirs, options: &RunOptions) -> Result<()> {
    let loaded = config::load(
        &options.config_path,
        Some(&options.queries_path),
        &dirs.results_dir(),
    )?;
    for skipped in &loaded.skipped {
        notifier_error!("{}", skipped);
    }
    if loaded.queries.is_empty() {
        notifier_error!("No defined queries in {:?}", options.config_path);
        return Ok(());
    }

    let settings = FetchSettings {
        email: Some(loaded.settings.email.clone()),
        ..FetchSettings::default()
    };
    let fetcher = EutilsFetcher::new(settings).context("building the HTTP client")?;
    let engine = Engine::new(Arc::new(fetcher), HistoryStore::new(dirs.history_file()));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting the async runtime")?;
    let outcome = runtime.block_on(engine.run(&loaded.queries))?;

    let had_errors = outcome.report.had_errors() || !loaded.skipped.is_empty();
    let target = options.output.clone().unwrap_or_else(|| {
        unique_digest_path(&loaded.settings.results_dir, &Local::now())
    });
    let written = write_digest(&outcome.sections, &target, had_errors.then(|| dirs.log_dir()))?;
    match &written {
        Some(path) => println!("New papers written to {}", path.display()),
        None => notifier_info!("No new papers"),
    }

    if options.notify {
        announce(&outcome.report, &DesktopNotifier);
    }
    Ok(())
}

/// Renders and writes the digest to `target`. Nothing is written when there
/// are no new items. `error_log` adds a note pointing at the log directory.
pub fn write_digest(
    sections: &[DigestSection],
    target: &Path,
    error_log: Option<PathBuf>,
) -> Result<Option<PathBuf>> {
    let Some(mut digest) = render_digest(sections, &DigestOptions::default()) else {
        return Ok(None);
    };
    if let Some(log_dir) = error_log {
        digest = annotate_with_errors(digest, &log_dir);
    }
    let filename = target
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("digest path {target:?} has no file name"))?;
    let path = AtomicFileWriter::for_file(target)
        .write(filename, &digest)
        .context("writing the digest")?;
    Ok(Some(path))
}

/// Sends the per-query summary if anything new was found.
pub fn announce(report: &RunReport, notifier: &dyn Notifier) -> bool {
    match notification_summary(report) {
        Some(message) => {
            notifier.send(&message);
            true
        }
        None => false,
    }
}

//! Logger initialization for the notifier binary.
//!
//! Records go to the terminal (errors on stderr) and to rotating
//! `log_<timestamp>` segments in the data directory.

use std::path::{Path, PathBuf};

use log::LevelFilter;
use notifier_logging::{RotatingLogFile, DEFAULT_SEGMENT_BYTES};
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

/// Initialize terminal and file logging. Returns the first log segment path,
/// or `None` when the file logger could not be opened.
pub fn initialize(log_dir: &Path, verbose: bool) -> Option<PathBuf> {
    let terminal_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let config = build_config();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        terminal_level,
        config.clone(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    let segment = match create_file_logger(LevelFilter::Info, config, log_dir) {
        Some((logger, path)) => {
            loggers.push(logger);
            Some(path)
        }
        None => None,
    };

    let _ = CombinedLogger::init(loggers);
    segment
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}

fn create_file_logger(
    level: LevelFilter,
    config: Config,
    log_dir: &Path,
) -> Option<(Box<WriteLogger<RotatingLogFile>>, PathBuf)> {
    match RotatingLogFile::open(log_dir, DEFAULT_SEGMENT_BYTES) {
        Ok(file) => {
            let path = file.current_path().to_path_buf();
            Some((WriteLogger::new(level, config, file), path))
        }
        Err(err) => {
            eprintln!("Warning: Could not create log file in {:?}: {}", log_dir, err);
            None
        }
    }
}

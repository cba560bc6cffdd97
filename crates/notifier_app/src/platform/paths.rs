use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};

const APP_DIR: &str = "pubmednotifier";

/// Per-user directories, following the XDG base directory layout.
#[derive(Debug, Clone)]
pub struct AppDirs {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
    pub cache_dir: PathBuf,
}

impl AppDirs {
    pub fn discover() -> Result<Self> {
        let base = |dir: Option<PathBuf>, kind: &str| {
            dir.map(|d| d.join(APP_DIR))
                .ok_or_else(|| anyhow!("could not determine the user {kind} directory"))
        };
        Ok(Self {
            config_dir: base(dirs::config_dir(), "config")?,
            data_dir: base(dirs::data_dir(), "data")?,
            cache_dir: base(dirs::cache_dir(), "cache")?,
        })
    }

    /// Creates every directory that does not exist yet.
    pub fn ensure(&self) -> Result<()> {
        for dir in [&self.config_dir, &self.data_dir, &self.cache_dir] {
            fs::create_dir_all(dir).with_context(|| format!("creating {dir:?}"))?;
        }
        Ok(())
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config")
    }

    pub fn queries_file(&self) -> PathBuf {
        self.data_dir.join("queries")
    }

    pub fn history_file(&self) -> PathBuf {
        self.data_dir.join("history")
    }

    pub fn results_dir(&self) -> PathBuf {
        self.data_dir.join("results")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.clone()
    }

    /// Creates the default queries file empty if it is missing.
    pub fn ensure_queries_file(&self) -> io::Result<PathBuf> {
        let path = self.queries_file();
        if !path.exists() {
            fs::File::create(&path)?;
        }
        Ok(path)
    }
}

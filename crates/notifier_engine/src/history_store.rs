use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use notifier_core::{History, Identifier};
use notifier_logging::notifier_info;
use thiserror::Error;

use crate::persist::{AtomicFileWriter, PersistError};

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history file {path:?} is unreadable: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("history file {path:?} could not be created: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("history file has no file name: {0:?}")]
    InvalidPath(PathBuf),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// Flat-file history: one identifier per line.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the persisted history. A missing file is created empty.
    pub fn load(&self) -> Result<History, HistoryError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => {
                let history = History::from_lines(&text);
                notifier_info!(
                    "Loaded {} identifiers from {:?}",
                    history.len(),
                    self.path
                );
                Ok(history)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                self.create_empty()?;
                notifier_info!("Created empty history at {:?}", self.path);
                Ok(History::new())
            }
            Err(source) => Err(HistoryError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Returns `current ∪ new_ids` and overwrites the file with the full set.
    /// Persisting the same set twice leaves an identical file.
    pub fn merge_and_persist<'a, I>(
        &self,
        current: &History,
        new_ids: I,
    ) -> Result<History, HistoryError>
    where
        I: IntoIterator<Item = &'a Identifier>,
    {
        let next = current.merged(new_ids);
        let filename = self
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| HistoryError::InvalidPath(self.path.clone()))?;
        AtomicFileWriter::for_file(&self.path).write(filename, &next.to_lines())?;
        notifier_info!(
            "History now holds {} identifiers ({} added)",
            next.len(),
            next.len() - current.len()
        );
        Ok(next)
    }

    fn create_empty(&self) -> Result<(), HistoryError> {
        let create_err = |source: io::Error| HistoryError::Create {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(create_err)?;
        }
        fs::File::create(&self.path).map_err(create_err)?;
        Ok(())
    }
}

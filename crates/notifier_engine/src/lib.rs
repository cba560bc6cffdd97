//! Notifier engine: PubMed fetching, history persistence and the run pipeline.
mod decode;
mod engine;
mod fetch;
mod filename;
mod history_store;
mod persist;
mod types;

pub use decode::{decode_articles, decode_search, DecodeError};
pub use engine::{Engine, EngineError, RunOutcome};
pub use fetch::{EutilsFetcher, FetchSettings, Fetcher, EUTILS_BASE};
pub use filename::{digest_filename, unique_digest_path};
pub use history_store::{HistoryError, HistoryStore};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use types::{FailureKind, FetchError};

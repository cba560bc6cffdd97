//! Notifier core: pure query, history and digest logic.
mod digest;
mod history;
mod identifier;
mod item;
mod novelty;
mod query;
mod report;

pub use digest::{
    annotate_with_errors, render_digest, DigestOptions, DigestSection, ABSTRACT_PLACEHOLDER,
    PUBMED_LINK_BASE, WRAP_WIDTH,
};
pub use history::History;
pub use identifier::Identifier;
pub use item::{Metadata, NewItem};
pub use novelty::{filter_new, ResultBatch};
pub use query::{Query, SearchParams};
pub use report::{notification_summary, QueryCount, RunReport};

use crate::Identifier;

/// Descriptive metadata for one record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Metadata {
    pub title: String,
    /// Journal or other publication venue.
    pub venue: String,
    pub year: Option<String>,
    pub authors: Vec<String>,
    pub abstract_text: Option<String>,
}

/// An identifier that was absent from history, with its hydrated metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub id: Identifier,
    pub metadata: Metadata,
}

impl NewItem {
    pub fn new(id: Identifier, metadata: Metadata) -> Self {
        Self { id, metadata }
    }
}

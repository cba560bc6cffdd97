use std::collections::HashSet;

use crate::{History, Identifier};

/// Identifiers per query name, in the order the queries ran.
///
/// Only queries whose search succeeded are present, so an empty entry means
/// "ran, nothing returned" rather than "failed".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultBatch {
    entries: Vec<(String, Vec<Identifier>)>,
}

impl ResultBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the result of one query. Names are expected to be unique.
    pub fn push(&mut self, query: impl Into<String>, ids: Vec<Identifier>) {
        self.entries.push((query.into(), ids));
    }

    pub fn get(&self, query: &str) -> Option<&[Identifier]> {
        self.entries
            .iter()
            .find(|(name, _)| name == query)
            .map(|(_, ids)| ids.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Identifier])> {
        self.entries
            .iter()
            .map(|(name, ids)| (name.as_str(), ids.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every identifier in the batch, once, in first-seen order.
    pub fn distinct_ids(&self) -> Vec<&Identifier> {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .flat_map(|(_, ids)| ids.iter())
            .filter(|id| seen.insert(*id))
            .collect()
    }
}

impl FromIterator<(String, Vec<Identifier>)> for ResultBatch {
    fn from_iter<T: IntoIterator<Item = (String, Vec<Identifier>)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Keeps, per query, the identifiers not in `history`, in their original
/// relative order. Every query of `batch` appears in the result.
///
/// Queries are filtered independently: an identifier new to two queries is
/// reported under both.
pub fn filter_new(batch: &ResultBatch, history: &History) -> ResultBatch {
    batch
        .entries
        .iter()
        .map(|(name, ids)| {
            let mut seen = HashSet::new();
            let fresh = ids
                .iter()
                .filter(|id| !history.contains(id) && seen.insert(*id))
                .cloned()
                .collect();
            (name.clone(), fresh)
        })
        .collect()
}

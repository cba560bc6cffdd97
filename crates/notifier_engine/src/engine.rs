use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use notifier_core::{
    filter_new, DigestSection, History, Identifier, Metadata, NewItem, Query, QueryCount,
    ResultBatch, RunReport,
};
use notifier_logging::{notifier_error, notifier_info};
use thiserror::Error;

use crate::fetch::Fetcher;
use crate::history_store::{HistoryError, HistoryStore};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    History(#[from] HistoryError),
}

/// Everything one pass produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// One section per query whose search succeeded, in query order.
    pub sections: Vec<DigestSection>,
    pub report: RunReport,
    /// History after this run's identifiers were merged.
    pub history: History,
}

/// Metadata gathered for the new identifiers of a run.
#[derive(Debug, Default)]
struct Hydration {
    found: HashMap<Identifier, Metadata>,
    failed: BTreeSet<Identifier>,
}

/// Runs queries one after another against a [`Fetcher`] and reconciles the
/// results with the [`HistoryStore`].
pub struct Engine {
    fetcher: Arc<dyn Fetcher>,
    store: HistoryStore,
}

impl Engine {
    pub fn new(fetcher: Arc<dyn Fetcher>, store: HistoryStore) -> Self {
        Self { fetcher, store }
    }

    /// One sequential pass: search, filter against history, hydrate, persist.
    ///
    /// Search and hydration failures are logged and skipped. Identifiers whose
    /// metadata could not be fetched stay out of history and are retried on
    /// the next run. Only history IO errors abort the pass.
    pub async fn run(&self, queries: &[Query]) -> Result<RunOutcome, EngineError> {
        let history = self.store.load()?;
        let (batch, failed_queries) = self.search_all(queries).await;
        let fresh = filter_new(&batch, &history);
        let hydration = self.hydrate(&fresh).await;

        let mut sections = Vec::with_capacity(fresh.len());
        let mut counts = Vec::with_capacity(fresh.len());
        for (query, ids) in fresh.iter() {
            let items: Vec<NewItem> = ids
                .iter()
                .filter_map(|id| {
                    hydration
                        .found
                        .get(id)
                        .map(|metadata| NewItem::new(id.clone(), metadata.clone()))
                })
                .collect();
            notifier_info!("Query '{}': {} new papers", query, items.len());
            counts.push(QueryCount {
                query: query.to_string(),
                count: items.len(),
            });
            sections.push(DigestSection::new(query, items));
        }

        let seen = fresh
            .distinct_ids()
            .into_iter()
            .filter(|id| hydration.found.contains_key(*id));
        let history = self.store.merge_and_persist(&history, seen)?;

        Ok(RunOutcome {
            sections,
            report: RunReport {
                counts,
                failed_queries,
                failed_items: hydration.failed.len(),
            },
            history,
        })
    }

    async fn search_all(&self, queries: &[Query]) -> (ResultBatch, Vec<String>) {
        let mut batch = ResultBatch::new();
        let mut failed = Vec::new();
        for query in queries {
            match self.fetcher.search(&query.term, &query.params).await {
                Ok(ids) => {
                    notifier_info!("Query '{}' returned {} identifiers", query.name, ids.len());
                    batch.push(query.name.clone(), ids);
                }
                Err(err) => {
                    notifier_error!("Query '{}' failed: {}", query.name, err);
                    failed.push(query.name.clone());
                }
            }
        }
        (batch, failed)
    }

    async fn hydrate(&self, fresh: &ResultBatch) -> Hydration {
        let mut hydration = Hydration::default();
        for id in fresh.distinct_ids() {
            match self.fetcher.fetch_metadata(id).await {
                Ok(metadata) => {
                    hydration.found.insert(id.clone(), metadata);
                }
                Err(err) => {
                    notifier_error!("Could not fetch metadata for {}: {}", id, err);
                    hydration.failed.insert(id.clone());
                }
            }
        }
        hydration
    }
}

/// Number of new items surfaced for one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryCount {
    pub query: String,
    pub count: usize,
}

/// What one run found, used for the notification and the digest note.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunReport {
    /// Per successful query, in run order.
    pub counts: Vec<QueryCount>,
    /// Queries whose search failed and were skipped.
    pub failed_queries: Vec<String>,
    /// Identifiers whose metadata could not be fetched.
    pub failed_items: usize,
}

impl RunReport {
    pub fn total_new(&self) -> usize {
        self.counts.iter().map(|c| c.count).sum()
    }

    pub fn count_for(&self, query: &str) -> Option<usize> {
        self.counts
            .iter()
            .find(|c| c.query == query)
            .map(|c| c.count)
    }

    pub fn had_errors(&self) -> bool {
        !self.failed_queries.is_empty() || self.failed_items > 0
    }
}

/// One `<query>: <count> new papers` line per query with new items, or
/// `None` if there is nothing to announce.
pub fn notification_summary(report: &RunReport) -> Option<String> {
    let lines: Vec<String> = report
        .counts
        .iter()
        .filter(|c| c.count > 0)
        .map(|c| format!("{}: {} new papers", c.query, c.count))
        .collect();
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

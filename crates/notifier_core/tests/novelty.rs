use std::sync::Once;

use notifier_core::{filter_new, History, Identifier, ResultBatch};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(notifier_logging::initialize_for_tests);
}

fn ids(raw: &[&str]) -> Vec<Identifier> {
    raw.iter().map(|id| Identifier::from(*id)).collect()
}

#[test]
fn drops_identifiers_already_in_history() {
    init_logging();
    let history = History::from_lines("111\n");
    let mut batch = ResultBatch::new();
    batch.push("cancer", ids(&["111", "222"]));

    let fresh = filter_new(&batch, &history);
    assert_eq!(fresh.get("cancer"), Some(ids(&["222"]).as_slice()));
}

#[test]
fn never_returns_a_history_member() {
    init_logging();
    let history = History::from_lines("1\n3\n5\n7\n");
    let mut batch = ResultBatch::new();
    batch.push("odd", ids(&["1", "3", "5", "7", "9"]));
    batch.push("all", ids(&["1", "2", "3", "4", "5", "6", "7", "8", "9"]));

    let fresh = filter_new(&batch, &history);
    for (_, found) in fresh.iter() {
        assert!(found.iter().all(|id| !history.contains(id)));
    }
}

#[test]
fn preserves_fetch_order() {
    init_logging();
    let history = History::from_lines("b\n");
    let mut batch = ResultBatch::new();
    batch.push("q", ids(&["z", "b", "a", "m"]));

    let fresh = filter_new(&batch, &history);
    assert_eq!(fresh.get("q"), Some(ids(&["z", "a", "m"]).as_slice()));
}

#[test]
fn keeps_queries_with_nothing_new() {
    init_logging();
    let history = History::from_lines("1\n2\n");
    let mut batch = ResultBatch::new();
    batch.push("seen", ids(&["1", "2"]));
    batch.push("empty", Vec::new());
    batch.push("fresh", ids(&["3"]));

    let fresh = filter_new(&batch, &history);
    let names: Vec<&str> = fresh.iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["seen", "empty", "fresh"]);
    assert_eq!(fresh.get("seen"), Some(&[][..]));
    assert_eq!(fresh.get("missing"), None);
}

#[test]
fn empty_batch_stays_empty() {
    init_logging();
    let fresh = filter_new(&ResultBatch::new(), &History::from_lines("1\n"));
    assert!(fresh.is_empty());
    assert_eq!(fresh.len(), 0);
}

#[test]
fn shared_identifier_is_new_for_every_query() {
    init_logging();
    let mut batch = ResultBatch::new();
    batch.push("a", ids(&["999"]));
    batch.push("b", ids(&["999", "1000"]));

    let fresh = filter_new(&batch, &History::new());
    assert_eq!(fresh.get("a"), Some(ids(&["999"]).as_slice()));
    assert_eq!(fresh.get("b"), Some(ids(&["999", "1000"]).as_slice()));

    let distinct = fresh.distinct_ids();
    assert_eq!(distinct.len(), 2);
    let history = History::new().merged(distinct);
    assert_eq!(history.to_lines(), "1000\n999\n");
}

#[test]
fn repeated_identifier_within_one_query_is_reported_once() {
    init_logging();
    let mut batch = ResultBatch::new();
    batch.push("q", ids(&["5", "6", "5"]));

    let fresh = filter_new(&batch, &History::new());
    assert_eq!(fresh.get("q"), Some(ids(&["5", "6"]).as_slice()));
}

//! Contract Test: Composite Modification Ordering
//!
//! Constraints verified:
//! - Children are queried in configured order
//! - Modifications are concatenated child by child, never re-sorted by time
//! - Children reporting nothing contribute nothing
//! - A failing child aborts the query

mod common;

use buildwatch_core::{ChangeSource, CompositeChangeSource, Error};
use chrono::{DateTime, Duration, Utc};
use common::*;
use tokio_test::{assert_err, assert_ok};

#[tokio::test]
async fn modifications_follow_child_order_not_timestamps() {
    let journal = Journal::new();
    let t = base_time();

    // A's changes are the newest, C's the oldest
    let composite = CompositeChangeSource::new(vec![
        Box::new(RecordingSource::new("a", &journal).with_files(&["a1", "a2"], t + Duration::hours(2))),
        Box::new(RecordingSource::new("b", &journal).with_files(&["b1"], t + Duration::hours(1))),
        Box::new(RecordingSource::new("c", &journal).with_files(&["c1", "c2"], t)),
    ]);

    let mods = assert_ok!(
        composite
            .get_modifications(DateTime::<Utc>::MIN_UTC, DateTime::<Utc>::MAX_UTC)
            .await
    );

    assert_eq!(file_names(&mods), vec!["a1", "a2", "b1", "c1", "c2"]);
    assert_eq!(mods[2].folder_name(), "/b");
    assert_eq!(journal.entries(), vec!["a:query", "b:query", "c:query"]);
}

#[tokio::test]
async fn empty_children_contribute_nothing() {
    let journal = Journal::new();
    let t = base_time();

    let composite = CompositeChangeSource::new(vec![
        Box::new(RecordingSource::new("empty1", &journal)),
        Box::new(RecordingSource::new("full", &journal).with_files(&["x"], t)),
        Box::new(RecordingSource::new("empty2", &journal)),
    ]);

    let mods = assert_ok!(composite.get_modifications(t, t).await);

    assert_eq!(file_names(&mods), vec!["x"]);
    assert_eq!(journal.entries().len(), 3, "every child must be queried");
}

#[tokio::test]
async fn nested_composites_flatten_in_order() {
    let journal = Journal::new();
    let t = base_time();

    let inner = CompositeChangeSource::new(vec![
        Box::new(RecordingSource::new("inner1", &journal).with_files(&["i1"], t)),
        Box::new(RecordingSource::new("inner2", &journal).with_files(&["i2"], t)),
    ]);
    let outer = CompositeChangeSource::new(vec![
        Box::new(RecordingSource::new("first", &journal).with_files(&["f"], t)),
        Box::new(inner),
        Box::new(RecordingSource::new("last", &journal).with_files(&["l"], t)),
    ]);

    let mods = assert_ok!(outer.get_modifications(t, t).await);
    assert_eq!(file_names(&mods), vec!["f", "i1", "i2", "l"]);
}

#[tokio::test]
async fn failing_child_aborts_query() {
    let journal = Journal::new();
    let t = base_time();

    let composite = CompositeChangeSource::new(vec![
        Box::new(RecordingSource::new("ok", &journal).with_files(&["x"], t)),
        Box::new(RecordingSource::new("down", &journal).failing_query()),
        Box::new(RecordingSource::new("never", &journal)),
    ]);

    let err = assert_err!(composite.get_modifications(t, t).await);

    assert!(matches!(err, Error::BackendUnavailable { ref source_name, .. } if source_name == "down"));
    assert!(err.is_unavailable());
    assert_eq!(journal.entries(), vec!["ok:query", "down:query"]);
}

#[tokio::test]
async fn repeated_queries_are_identical() {
    let journal = Journal::new();
    let t = base_time();

    let composite = CompositeChangeSource::new(vec![
        Box::new(RecordingSource::new("a", &journal).with_files(&["a1"], t)),
        Box::new(RecordingSource::new("b", &journal).with_files(&["b1"], t)),
    ]);

    let first = assert_ok!(composite.get_modifications(t, t).await);
    let second = assert_ok!(composite.get_modifications(t, t).await);
    assert_eq!(first, second);
}

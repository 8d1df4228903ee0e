//! Contract Test: Build Lifecycle Around a Poll
//!
//! Constraints verified:
//! - prepare_build fetches sources before creating temporary labels
//! - A successful build is labeled only when label_on_success is enabled
//! - A failed build removes temporary labels instead of labeling
//! - Label failures are surfaced, not swallowed

mod common;

use buildwatch_core::{
    ChangeMonitor, CompositeChangeSource, Error, IntegrationResult, MonitorConfig, MonitorEvent,
};
use common::*;
use tokio_test::{assert_err, assert_ok};

fn labeling_config() -> MonitorConfig {
    MonitorConfig {
        label_on_success: true,
        ..MonitorConfig::default()
    }
}

fn two_repo_composite(journal: &Journal) -> CompositeChangeSource {
    CompositeChangeSource::new(vec![
        Box::new(RecordingSource::new("app", journal).with_temporary_labels()),
        Box::new(RecordingSource::new("libs", journal)),
    ])
}

#[tokio::test]
async fn successful_build_is_labeled() {
    let journal = Journal::new();
    let (monitor, mut events) = assert_ok!(ChangeMonitor::new(
        Box::new(two_repo_composite(&journal)),
        test_project(),
        labeling_config(),
    ));

    let result = IntegrationResult::new("contract").with_label("build-12");
    assert_ok!(monitor.prepare_build(&result).await);

    let result = result.with_status(buildwatch_core::IntegrationStatus::Success);
    assert_ok!(monitor.complete_build(&result).await);

    assert_eq!(
        journal.entries(),
        vec![
            "app:get_source",
            "libs:get_source",
            "app:temp_create",
            "app:label:build-12",
            "libs:label:build-12",
        ]
    );
    assert_eq!(
        events.try_recv().unwrap(),
        MonitorEvent::TemporaryLabelCreated {
            project: "contract".to_string()
        }
    );
    assert_eq!(
        events.try_recv().unwrap(),
        MonitorEvent::Labeled {
            project: "contract".to_string(),
            label: "build-12".to_string()
        }
    );
}

#[tokio::test]
async fn labeling_disabled_by_default() {
    let journal = Journal::new();
    let (monitor, _events) = assert_ok!(ChangeMonitor::new(
        Box::new(two_repo_composite(&journal)),
        test_project(),
        MonitorConfig::default(),
    ));

    let result = IntegrationResult::successful("contract").with_label("build-13");
    assert_ok!(monitor.complete_build(&result).await);

    assert!(journal.entries().is_empty());
}

#[tokio::test]
async fn failed_build_rolls_back_temporary_label() {
    let journal = Journal::new();
    let (monitor, mut events) = assert_ok!(ChangeMonitor::new(
        Box::new(two_repo_composite(&journal)),
        test_project(),
        labeling_config(),
    ));

    let result = IntegrationResult::failed("contract").with_label("build-14");
    assert_ok!(monitor.complete_build(&result).await);

    assert_eq!(journal.entries(), vec!["app:temp_delete"]);
    assert_eq!(
        events.try_recv().unwrap(),
        MonitorEvent::TemporaryLabelDeleted {
            project: "contract".to_string()
        }
    );
}

#[tokio::test]
async fn source_without_capability_skips_temporary_labels() {
    let journal = Journal::new();
    let (monitor, mut events) = assert_ok!(ChangeMonitor::new(
        Box::new(RecordingSource::new("plain", &journal)),
        test_project(),
        labeling_config(),
    ));

    let result = IntegrationResult::exceptioned("contract");
    assert_ok!(monitor.prepare_build(&result).await);
    assert_ok!(monitor.complete_build(&result).await);

    assert_eq!(journal.entries(), vec!["plain:get_source"]);
    assert!(events.try_recv().is_err(), "no temporary label events expected");
}

#[tokio::test]
async fn label_failure_is_reported() {
    let journal = Journal::new();
    let composite = CompositeChangeSource::new(vec![
        Box::new(RecordingSource::new("app", &journal).failing_label()),
        Box::new(RecordingSource::new("libs", &journal)),
    ]);
    let (monitor, mut events) = assert_ok!(ChangeMonitor::new(
        Box::new(composite),
        test_project(),
        labeling_config(),
    ));

    let result = IntegrationResult::successful("contract").with_label("build-15");
    let err = assert_err!(monitor.complete_build(&result).await);

    assert!(matches!(err, Error::LabelFailure { .. }));
    assert_eq!(journal.entries(), vec!["app:label:build-15"]);
    assert!(matches!(
        events.try_recv().unwrap(),
        MonitorEvent::LabelFailed { .. }
    ));
}

//! Outbox draining through the synchronizer.
//!
//! Covers:
//! - delivery then failure then retry
//! - outbox convergence and idempotence
//! - invalid-target pruning and unknown-target retention
//! - drain serialization and cancellation

use super::harness::{
    completed, Existence, TestHarness, WriteOutcome, CLIENT, OTHER_PROFESSIONAL_ID,
    PROFESSIONAL_ID,
};
use crate::DrainReport;
use professional_remote::StatisticDelivery;
use std::time::Duration;

#[tokio::test]
async fn failure_then_retry_converges() {
    let h = TestHarness::connected();
    h.backend.script_writes(&[WriteOutcome::Reject, WriteOutcome::Accept]);

    let result = completed("Stroop", 9, 33);
    h.sync.record_result(result.clone()).await.unwrap();
    assert_eq!(h.pending_count(), 1);

    let report = h.sync.drain_outbox().await.unwrap().expect("drain ran");

    assert_eq!(report.synced, 1);
    assert_eq!(h.pending_count(), 0);
    assert!(h.sync.results().is_uploaded(&result.id).unwrap());
}

#[tokio::test]
async fn repeated_drains_are_idempotent() {
    let h = TestHarness::connected();
    h.backend.script_writes(&[WriteOutcome::Reject, WriteOutcome::Reject]);
    h.sync.record_result(completed("Stroop", 1, 1)).await.unwrap();
    h.sync.record_result(completed("Stroop", 2, 1)).await.unwrap();

    let first = h.sync.drain_outbox().await.unwrap().unwrap();
    let second = h.sync.drain_outbox().await.unwrap().unwrap();

    assert_eq!(first.synced, 2);
    assert_eq!(second, DrainReport::default());
    assert_eq!(h.backend.delivered_results().len(), 2);
}

#[tokio::test]
async fn entries_for_missing_professional_are_pruned_without_write() {
    let h = TestHarness::connected();
    h.backend.script_writes(&[WriteOutcome::Reject]);
    h.sync.record_result(completed("Stroop", 1, 1)).await.unwrap();
    let writes_before = h.backend.write_calls();

    h.backend.set_professional(PROFESSIONAL_ID, Existence::Absent);
    let report = h.sync.drain_outbox().await.unwrap().unwrap();

    assert_eq!(report.invalid_target, 1);
    assert_eq!(report.synced, 0);
    assert_eq!(h.pending_count(), 0);
    assert_eq!(h.backend.write_calls(), writes_before);
}

#[tokio::test]
async fn entries_survive_while_professional_unverifiable() {
    let h = TestHarness::connected();
    h.backend.script_writes(&[WriteOutcome::Reject]);
    let result = completed("Stroop", 1, 1);
    h.sync.record_result(result.clone()).await.unwrap();

    h.backend.set_professional(PROFESSIONAL_ID, Existence::Down);
    let report = h.sync.drain_outbox().await.unwrap().unwrap();

    assert_eq!(report.still_pending, 1);
    assert_eq!(h.pending_count(), 1);
    assert!(!h.sync.results().is_uploaded(&result.id).unwrap());

    h.backend.set_professional(PROFESSIONAL_ID, Existence::Present);
    let report = h.sync.drain_outbox().await.unwrap().unwrap();
    assert_eq!(report.synced, 1);
    assert!(h.sync.results().is_uploaded(&result.id).unwrap());
}

#[tokio::test]
async fn mixed_targets_in_one_pass() {
    let h = TestHarness::new();
    h.backend.set_professional(OTHER_PROFESSIONAL_ID, Existence::Absent);
    for professional_id in [PROFESSIONAL_ID, OTHER_PROFESSIONAL_ID, PROFESSIONAL_ID] {
        let result = completed("Stroop", 1, 1);
        let delivery =
            StatisticDelivery::for_result(professional_id, CLIENT, &result, true).unwrap();
        h.outbox().enqueue(delivery).unwrap();
    }

    let report = h.sync.drain_outbox().await.unwrap().unwrap();

    assert_eq!(report.synced, 2);
    assert_eq!(report.invalid_target, 1);
    assert_eq!(h.backend.exists_calls(), 2);
    assert_eq!(h.pending_count(), 0);
}

#[tokio::test]
async fn concurrent_drains_are_serialized() {
    let h = TestHarness::connected();
    h.backend.script_writes(&[WriteOutcome::Reject]);
    h.sync.record_result(completed("Stroop", 1, 1)).await.unwrap();

    let (first, second) = tokio::join!(h.sync.drain_outbox(), h.sync.drain_outbox());
    let (first, second) = (first.unwrap(), second.unwrap());

    let ran: Vec<_> = [first, second].into_iter().flatten().collect();
    assert_eq!(ran.len(), 1);
    assert_eq!(ran[0].synced, 1);
    assert_eq!(h.backend.delivered_results().len(), 1);
}

#[tokio::test]
async fn status_reports_drain_in_progress() {
    let h = TestHarness::connected();
    h.backend.script_writes(&[WriteOutcome::Reject]);
    h.sync.record_result(completed("Stroop", 1, 1)).await.unwrap();
    h.backend.delay_checks(Some(Duration::from_millis(50)));

    let observe = async {
        tokio::task::yield_now().await;
        h.sync.status().unwrap()
    };
    let (report, during) = tokio::join!(h.sync.drain_outbox(), observe);

    assert!(during.drain_in_progress);
    assert_eq!(during.pending, 1);
    assert!(report.unwrap().is_some());
    assert!(!h.sync.status().unwrap().drain_in_progress);
}

#[tokio::test]
async fn cancelled_drain_releases_flag_and_keeps_entries() {
    let h = TestHarness::connected();
    h.backend.script_writes(&[WriteOutcome::Reject]);
    h.sync.record_result(completed("Stroop", 1, 1)).await.unwrap();
    h.backend.delay_checks(Some(Duration::from_millis(500)));

    let cancelled = tokio::time::timeout(Duration::from_millis(20), h.sync.drain_outbox()).await;
    assert!(cancelled.is_err());
    assert_eq!(h.pending_count(), 1);

    h.backend.delay_checks(None);
    let report = h.sync.drain_outbox().await.unwrap().expect("flag released");
    assert_eq!(report.synced, 1);
}

#[tokio::test]
async fn outbox_survives_restart() {
    let h = TestHarness::connected();
    h.backend.script_writes(&[WriteOutcome::Reject]);
    let result = completed("Stroop", 1, 1);
    h.sync.record_result(result.clone()).await.unwrap();

    let restarted = h.reopen();
    assert_eq!(restarted.pending_deliveries().unwrap().len(), 1);

    let report = restarted.drain_outbox().await.unwrap().unwrap();
    assert_eq!(report.synced_result_ids, vec![result.id.clone()]);
    assert!(restarted.results().is_uploaded(&result.id).unwrap());
}

#[tokio::test]
async fn status_counts_pending_and_unuploaded() {
    let h = TestHarness::connected();
    h.backend.script_writes(&[WriteOutcome::Reject]);
    h.sync.record_result(completed("Stroop", 1, 1)).await.unwrap();
    h.sync.record_result(completed("Stroop", 2, 1)).await.unwrap();

    let status = h.sync.status().unwrap();

    assert!(status.is_connected());
    assert_eq!(status.pending, 1);
    assert_eq!(status.unuploaded, 1);
    assert!(!status.drain_in_progress);
}

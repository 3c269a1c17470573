//! Integration tests for the review polling sequence.
//!
//! Exercises: ReviewSyncController::activate, deactivate, snapshot, with the
//! clock paused so every delay elapses instantly and deterministically.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use redline_core::error::FetchError;
use redline_core::review_sync::{PollConfig, ReviewSource, ReviewSyncController, SyncStatus};
use redline_core::types::ReviewRecord;
use tokio::sync::Notify;

fn review(comparison: &str, diff_id: &str) -> ReviewRecord {
    ReviewRecord {
        id: None,
        comparison_id: comparison.into(),
        diff_id: diff_id.into(),
        risk_level: "中".into(),
        compliance: "符合".into(),
        review_suggestions: "ok".into(),
        raw_ai_response: None,
        created_at: None,
    }
}

fn poll(max_attempts: u32) -> PollConfig {
    PollConfig {
        initial_delay: Duration::from_millis(3000),
        interval: Duration::from_millis(3000),
        max_attempts,
    }
}

/// Returns empty results until attempt `ready_on`, then `records`.
struct ReadyOn {
    ready_on: usize,
    records: Vec<ReviewRecord>,
    calls: AtomicUsize,
}

#[async_trait]
impl ReviewSource for ReadyOn {
    async fn fetch_reviews(&self, _: &str) -> Result<Vec<ReviewRecord>, FetchError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call >= self.ready_on {
            Ok(self.records.clone())
        } else {
            Ok(Vec::new())
        }
    }
}

#[tokio::test(start_paused = true)]
async fn always_empty_ends_in_error_after_budget() {
    let source = Arc::new(ReadyOn {
        ready_on: usize::MAX,
        records: Vec::new(),
        calls: AtomicUsize::new(0),
    });
    let ctl = ReviewSyncController::new(source.clone(), poll(100), None);
    ctl.activate("cmp", true);

    // 3 s initial delay + 99 intervals of 3 s.
    tokio::time::sleep(Duration::from_secs(299)).await;
    assert_eq!(ctl.snapshot().status, SyncStatus::Processing);
    tokio::time::sleep(Duration::from_secs(2)).await;

    let state = ctl.snapshot();
    assert_eq!(state.status, SyncStatus::Error);
    assert_eq!(state.attempts, 100);
    assert_eq!(source.calls.load(Ordering::SeqCst), 100);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(source.calls.load(Ordering::SeqCst), 100, "no fetch after giving up");
}

#[tokio::test(start_paused = true)]
async fn completes_on_fourth_attempt_and_stops() {
    let source = Arc::new(ReadyOn {
        ready_on: 4,
        records: vec![review("cmp", "d1"), review("cmp", "d2")],
        calls: AtomicUsize::new(0),
    });
    let ctl = ReviewSyncController::new(source.clone(), poll(10), None);
    ctl.activate("cmp", true);

    tokio::time::sleep(Duration::from_secs(120)).await;

    let state = ctl.snapshot();
    assert_eq!(state.status, SyncStatus::Completed);
    assert_eq!(state.attempts, 4);
    assert_eq!(state.reviews.len(), 2);
    assert_eq!(source.calls.load(Ordering::SeqCst), 4);
}

/// Answers for comparison `slow` only after the gate opens.
struct Gated {
    gate: Notify,
    calls: Mutex<HashMap<String, usize>>,
}

#[async_trait]
impl ReviewSource for Gated {
    async fn fetch_reviews(&self, comparison_id: &str) -> Result<Vec<ReviewRecord>, FetchError> {
        *self.calls.lock().unwrap().entry(comparison_id.to_owned()).or_default() += 1;
        if comparison_id == "slow" {
            self.gate.notified().await;
            return Ok(vec![review("slow", "stale")]);
        }
        Ok(Vec::new())
    }
}

#[tokio::test(start_paused = true)]
async fn stale_response_cannot_touch_new_comparison() {
    let source = Arc::new(Gated { gate: Notify::new(), calls: Mutex::new(HashMap::new()) });
    let ctl = ReviewSyncController::new(source.clone(), poll(2), None);

    ctl.activate("slow", true);
    tokio::time::sleep(Duration::from_secs(4)).await;
    assert_eq!(source.calls.lock().unwrap()["slow"], 1, "first fetch is in flight");

    ctl.deactivate();
    assert_eq!(ctl.snapshot().status, SyncStatus::Idle);
    assert_eq!(ctl.snapshot().comparison_id, None);

    ctl.activate("fast", true);
    source.gate.notify_one();
    tokio::time::sleep(Duration::from_secs(30)).await;

    let state = ctl.snapshot();
    assert_eq!(state.comparison_id.as_deref(), Some("fast"));
    assert_eq!(state.status, SyncStatus::Error);
    assert!(state.reviews.is_empty(), "stale records were applied: {:?}", state.reviews);
    assert_eq!(source.calls.lock().unwrap()["slow"], 1, "stale sequence never retried");
}

#[tokio::test(start_paused = true)]
async fn switching_comparison_resets_attempts() {
    let source = Arc::new(ReadyOn {
        ready_on: usize::MAX,
        records: Vec::new(),
        calls: AtomicUsize::new(0),
    });
    let ctl = ReviewSyncController::new(source, poll(50), None);

    ctl.activate("a", true);
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(ctl.snapshot().attempts, 3);

    ctl.activate("b", true);
    let state = ctl.snapshot();
    assert_eq!(state.comparison_id.as_deref(), Some("b"));
    assert_eq!(state.attempts, 0);
    assert_eq!(state.status, SyncStatus::Processing);

    tokio::time::sleep(Duration::from_secs(4)).await;
    assert_eq!(ctl.snapshot().attempts, 1);
}

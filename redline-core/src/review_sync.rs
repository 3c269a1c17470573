//! Bounded polling of the review backend for one comparison at a time.
//!
//! The controller owns a small state machine:
//!
//! ```text
//! idle ──activate(enabled)──▶ processing ──non-empty──▶ completed
//!                                 │                        │
//!                                 └──budget spent──▶ error │
//!                                         ▲   retry        │ retry
//!                                         └────────────────┘──▶ processing
//! ```
//!
//! One tokio task drives each polling sequence and performs its attempts
//! strictly one after another. Every sequence is stamped with a generation
//! number; activating another comparison, deactivating, or retrying bumps the
//! generation, and a task whose stamp no longer matches drops whatever it was
//! about to write and exits. Nothing is aborted from the outside.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::types::ReviewRecord;

/// Where review records come from. Implemented over HTTP by
/// [`crate::client::ReviewClient`] and by scripted sources in tests.
#[async_trait]
pub trait ReviewSource: Send + Sync {
    /// Returns the reviews stored so far for `comparison_id`. An empty list
    /// means the review job has not produced anything yet.
    async fn fetch_reviews(&self, comparison_id: &str) -> Result<Vec<ReviewRecord>, FetchError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncStatus {
    #[default]
    Idle,
    Processing,
    Completed,
    /// Attempt budget spent, either on failures or on empty results.
    Error,
}

impl SyncStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SyncStatus::Idle => "idle",
            SyncStatus::Processing => "processing",
            SyncStatus::Completed => "completed",
            SyncStatus::Error => "error",
        }
    }
}

/// Snapshot of the controller handed to the UI.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewSyncState {
    pub comparison_id: Option<String>,
    pub enabled: bool,
    pub status: SyncStatus,
    pub reviews: Vec<ReviewRecord>,
    /// Fetches issued in the current sequence.
    pub attempts: u32,
    /// Message of the most recent failed attempt, or the timeout notice.
    pub last_error: Option<String>,
}

/// Timing of a polling sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub initial_delay: Duration,
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(3000),
            interval: Duration::from_millis(3000),
            max_attempts: 100,
        }
    }
}

/// Called with a fresh snapshot after every state change.
pub type SyncListener = Arc<dyn Fn(&ReviewSyncState) + Send + Sync>;

struct Shared {
    generation: u64,
    state: ReviewSyncState,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct ReviewSyncController {
    source: Arc<dyn ReviewSource>,
    config: PollConfig,
    shared: Arc<Mutex<Shared>>,
    listener: Option<SyncListener>,
}

impl ReviewSyncController {
    pub fn new(
        source: Arc<dyn ReviewSource>,
        config: PollConfig,
        listener: Option<SyncListener>,
    ) -> Self {
        Self {
            source,
            config,
            shared: Arc::new(Mutex::new(Shared {
                generation: 0,
                state: ReviewSyncState::default(),
            })),
            listener,
        }
    }

    pub fn snapshot(&self) -> ReviewSyncState {
        lock(&self.shared).state.clone()
    }

    /// Makes `comparison_id` the active comparison.
    ///
    /// Any sequence for a previous comparison is invalidated and the state is
    /// reset to idle. With `enabled` set, a new sequence starts immediately in
    /// `processing`. Re-activating the comparison that is already active with
    /// the same flag is a no-op.
    ///
    /// Must be called from within a tokio runtime.
    pub fn activate(&self, comparison_id: &str, enabled: bool) {
        let snapshot = {
            let mut shared = lock(&self.shared);
            let current = &shared.state;
            if current.comparison_id.as_deref() == Some(comparison_id)
                && current.enabled == enabled
                && current.status != SyncStatus::Idle
            {
                return;
            }
            shared.generation += 1;
            shared.state = ReviewSyncState {
                comparison_id: Some(comparison_id.to_owned()),
                enabled,
                ..ReviewSyncState::default()
            };
            if enabled {
                self.start(&mut shared);
            } else {
                debug!(comparison = comparison_id, "review sync disabled for comparison");
            }
            shared.state.clone()
        };
        self.notify(&snapshot);
    }

    /// Cancels any pending attempt and forgets the active comparison.
    pub fn deactivate(&self) {
        let snapshot = {
            let mut shared = lock(&self.shared);
            shared.generation += 1;
            shared.state = ReviewSyncState::default();
            shared.state.clone()
        };
        self.notify(&snapshot);
    }

    /// User-initiated refresh. Restarts a full bounded sequence from
    /// `completed` or `error`. Returns `false` when there is nothing to retry:
    /// no active comparison, review disabled, or a sequence already running.
    ///
    /// Reviews already received stay visible until the new sequence replaces
    /// them.
    pub fn retry(&self) -> bool {
        let snapshot = {
            let mut shared = lock(&self.shared);
            let state = &shared.state;
            if state.comparison_id.is_none()
                || !state.enabled
                || matches!(state.status, SyncStatus::Idle | SyncStatus::Processing)
            {
                return false;
            }
            shared.generation += 1;
            shared.state.attempts = 0;
            shared.state.last_error = None;
            self.start(&mut shared);
            shared.state.clone()
        };
        info!(comparison = ?snapshot.comparison_id, "review sync retried");
        self.notify(&snapshot);
        true
    }

    /// Enters `processing` and spawns the task for the current generation.
    fn start(&self, shared: &mut Shared) {
        let Some(comparison_id) = shared.state.comparison_id.clone() else {
            return;
        };
        shared.state.status = SyncStatus::Processing;
        let poll = Poll {
            shared: Arc::clone(&self.shared),
            source: Arc::clone(&self.source),
            listener: self.listener.clone(),
            config: self.config,
            generation: shared.generation,
            comparison_id,
        };
        tokio::spawn(poll.run());
    }

    fn notify(&self, state: &ReviewSyncState) {
        if let Some(listener) = &self.listener {
            listener(state);
        }
    }
}

impl Drop for ReviewSyncController {
    fn drop(&mut self) {
        lock(&self.shared).generation += 1;
    }
}

/// One polling sequence, bound to the generation it was issued for.
struct Poll {
    shared: Arc<Mutex<Shared>>,
    source: Arc<dyn ReviewSource>,
    listener: Option<SyncListener>,
    config: PollConfig,
    generation: u64,
    comparison_id: String,
}

impl Poll {
    async fn run(self) {
        let max_attempts = self.config.max_attempts.max(1);
        let mut delay = self.config.initial_delay;

        loop {
            tokio::time::sleep(delay).await;
            delay = self.config.interval;

            let attempt = {
                let mut shared = lock(&self.shared);
                if shared.generation != self.generation {
                    return;
                }
                shared.state.attempts += 1;
                shared.state.attempts
            };
            debug!(comparison = %self.comparison_id, attempt, "fetching reviews");

            let result = self.source.fetch_reviews(&self.comparison_id).await;

            let (snapshot, done) = {
                let mut shared = lock(&self.shared);
                if shared.generation != self.generation {
                    debug!(
                        comparison = %self.comparison_id,
                        attempt,
                        "discarding stale review response"
                    );
                    return;
                }
                let state = &mut shared.state;
                let done = match result {
                    Ok(reviews) if !reviews.is_empty() => {
                        info!(
                            comparison = %self.comparison_id,
                            attempt,
                            count = reviews.len(),
                            "reviews received"
                        );
                        state.reviews = reviews;
                        state.status = SyncStatus::Completed;
                        state.last_error = None;
                        true
                    }
                    Ok(_) => false,
                    Err(e) => {
                        warn!(
                            comparison = %self.comparison_id,
                            attempt,
                            error = %e,
                            "review fetch failed"
                        );
                        state.last_error = Some(e.to_string());
                        false
                    }
                };
                let done = done || {
                    if attempt >= max_attempts {
                        warn!(comparison = %self.comparison_id, attempt, "review polling gave up");
                        state.status = SyncStatus::Error;
                        if state.last_error.is_none() {
                            state.last_error =
                                Some(format!("no review results after {attempt} attempts"));
                        }
                        true
                    } else {
                        false
                    }
                };
                (state.clone(), done)
            };

            if let Some(listener) = &self.listener {
                listener(&snapshot);
            }
            if done {
                return;
            }
        }
    }
}

//! # Worker liveness tracker with sequence-based ordering.
//!
//! Maintains which pipeline workers are currently running, using event
//! sequence numbers to handle out-of-order delivery.
//!
//! ```text
//! run_worker ──► Bus ──► subscriber_listener() ──► AliveTracker::update()
//!                                                         │
//!                                                         ▼
//!                                           HashMap<String, WorkerState>
//!                                               (name → {seq, alive})
//! ```
//!
//! ## Rules
//! - Only `WorkerStarting` / `WorkerStopped` / `WorkerFailed` change alive state
//! - Reads are eventually consistent with the bus
//! - Events with `seq <= last_seq` for the same worker are rejected (stale)

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::events::{Event, EventKind};

#[derive(Debug, Clone, Copy)]
struct WorkerState {
    last_seq: Option<u64>,
    alive: bool,
}

/// Names of the workers currently running.
///
/// Used by the supervisor to name stuck workers when the shutdown grace
/// period runs out.
#[derive(Default)]
pub(crate) struct AliveTracker {
    state: RwLock<HashMap<String, WorkerState>>,
}

impl AliveTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Applies a lifecycle event if it is newer than the last one seen for
    /// that worker. Returns true if alive state changed.
    ///
    /// ```text
    /// update(WorkerStopped,  seq=100) → alive=false, last_seq=100
    /// update(WorkerStarting, seq=99)  → rejected (stale)
    /// ```
    pub(crate) async fn update(&self, ev: &Event) -> bool {
        let alive = match ev.kind {
            EventKind::WorkerStarting => true,
            EventKind::WorkerStopped | EventKind::WorkerFailed => false,
            _ => return false,
        };
        let Some(name) = ev.worker.as_deref() else {
            return false;
        };

        let mut state = self.state.write().await;
        let entry = state.entry(name.to_string()).or_insert(WorkerState {
            last_seq: None,
            alive: false,
        });
        if entry.last_seq.is_some_and(|last| ev.seq <= last) {
            return false;
        }
        entry.last_seq = Some(ev.seq);
        entry.alive = alive;
        true
    }

    /// Sorted names of the workers still alive.
    pub(crate) async fn snapshot(&self) -> Vec<String> {
        let state = self.state.read().await;
        let mut alive: Vec<String> = state
            .iter()
            .filter(|(_, ws)| ws.alive)
            .map(|(name, _)| name.clone())
            .collect();
        alive.sort_unstable();
        alive
    }
}

//! # Runtime events emitted by the supervisor and pipeline workers.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Subscriber events**: delivery problems inside the subscriber set
//! - **Shutdown events**: cancellation and join outcome
//! - **Worker lifecycle events**: each worker starting, stopping or failing
//! - **Pipeline events**: rounds generated/delivered, answers, snapshots
//!
//! The [`Event`] struct carries optional metadata (worker name, player id,
//! round number, question text, choice, reason) set depending on the kind.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use triviavisor::{Event, EventKind, PlayerId};
//!
//! let ev = Event::new(EventKind::RoundDelivered)
//!     .with_worker("player-2")
//!     .with_player(PlayerId::new(2).unwrap())
//!     .with_round(7)
//!     .with_question("What is 2 + 2?");
//!
//! assert_eq!(ev.kind, EventKind::RoundDelivered);
//! assert_eq!(ev.player, Some(2));
//! assert_eq!(ev.question.as_deref(), Some("What is 2 + 2?"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::game::PlayerId;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `worker`: subscriber name
    /// - `reason`: panic info
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `worker`: subscriber name
    /// - `reason`: "full" or "closed"
    SubscriberOverflow,

    // === Shutdown events ===
    /// Shutdown requested (operator trigger or OS signal). Published once.
    ShutdownRequested,

    /// All workers stopped within the configured grace period.
    AllStoppedWithin,

    /// Grace period exceeded; remaining workers were aborted.
    ///
    /// Sets:
    /// - `reason`: comma-separated names of the stuck workers
    GraceExceeded,

    // === Worker lifecycle events ===
    /// Worker task is starting.
    ///
    /// Sets:
    /// - `worker`: worker name
    WorkerStarting,

    /// Worker returned cleanly (input closed or cancellation observed).
    ///
    /// Sets:
    /// - `worker`: worker name
    WorkerStopped,

    /// Worker returned an error.
    ///
    /// Sets:
    /// - `worker`: worker name
    /// - `reason`: error message
    WorkerFailed,

    // === Pipeline events ===
    /// Round source generated a round.
    ///
    /// Sets:
    /// - `round`: round sequence number
    /// - `question`: question text
    RoundGenerated,

    /// A player received a round.
    ///
    /// Sets:
    /// - `worker`, `player`, `round`, `question`
    RoundDelivered,

    /// A player submitted an answer to the tally.
    ///
    /// Sets:
    /// - `player`, `round`, `choice`
    AnswerSubmitted,

    /// The tally applied an answer and produced a snapshot.
    ///
    /// Sets:
    /// - `round`, `choice`, `snapshot`: snapshot sequence number
    AnswerTallied,

    /// A snapshot was surfaced by the publish sink.
    ///
    /// Sets:
    /// - `snapshot`, `reason`: rendered counts
    SnapshotPublished,

    /// The publish sink failed for one snapshot (non-fatal).
    ///
    /// Sets:
    /// - `worker`: sink name
    /// - `snapshot`, `reason`: error message
    PublishFailed,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Worker (or subscriber/sink) name, if applicable.
    pub worker: Option<Arc<str>>,
    /// Player id, if applicable.
    pub player: Option<u32>,
    /// Round sequence number.
    pub round: Option<u64>,
    /// Question text.
    pub question: Option<Arc<str>>,
    /// Chosen option index.
    pub choice: Option<usize>,
    /// Tally snapshot sequence number.
    pub snapshot: Option<u64>,
    /// Human-readable reason (errors, overflow details, rendered counts).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            worker: None,
            player: None,
            round: None,
            question: None,
            choice: None,
            snapshot: None,
            reason: None,
        }
    }

    /// Attaches a worker name.
    #[inline]
    pub fn with_worker(mut self, worker: impl Into<Arc<str>>) -> Self {
        self.worker = Some(worker.into());
        self
    }

    /// Attaches a player id.
    #[inline]
    pub fn with_player(mut self, player: PlayerId) -> Self {
        self.player = Some(player.get());
        self
    }

    /// Attaches a round sequence number.
    #[inline]
    pub fn with_round(mut self, round: u64) -> Self {
        self.round = Some(round);
        self
    }

    /// Attaches question text.
    #[inline]
    pub fn with_question(mut self, question: impl Into<Arc<str>>) -> Self {
        self.question = Some(question.into());
        self
    }

    /// Attaches a choice index.
    #[inline]
    pub fn with_choice(mut self, choice: usize) -> Self {
        self.choice = Some(choice);
        self
    }

    /// Attaches a snapshot sequence number.
    #[inline]
    pub fn with_snapshot(mut self, seq: u64) -> Self {
        self.snapshot = Some(seq);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_worker(subscriber)
            .with_reason(reason)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_worker(subscriber)
            .with_reason(info)
    }

    /// True for events produced by the subscriber set itself.
    #[inline]
    pub fn is_subscriber_event(&self) -> bool {
        matches!(
            self.kind,
            EventKind::SubscriberOverflow | EventKind::SubscriberPanicked
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_numbers_increase() {
        let a = Event::new(EventKind::WorkerStarting);
        let b = Event::new(EventKind::WorkerStopped);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn subscriber_helpers_set_name_and_reason() {
        let ev = Event::subscriber_overflow("log", "full");
        assert!(ev.is_subscriber_event());
        assert_eq!(ev.worker.as_deref(), Some("log"));
        assert_eq!(ev.reason.as_deref(), Some("full"));
    }
}

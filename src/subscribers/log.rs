//! # LogWriter: event printer
//!
//! A subscriber that prints incoming [`Event`]s to stdout, one line each.
//! The binary installs it so the operator sees every round delivered to a
//! player.
//!
//! Output is best-effort: events dropped by a lagging bus receiver or a full
//! subscriber queue are never printed. Each player also records the delivery
//! as an `info` tracing event, which does not depend on any subscriber.
//!
//! ## Example output
//! ```text
//! [starting] worker="player-1"
//! [round] round=1 question="What is 2 + 2?"
//! [delivered] player=1 round=1 question="What is 2 + 2?"
//! [answer] player=1 round=1 choice=3
//! [shutdown-requested]
//! [stopped] worker="player-1"
//! [all-stopped-within-grace]
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
///
/// Tally snapshots are not printed here; surfacing them is the job of the
/// publish sink.
#[derive(Default)]
pub struct LogWriter {
    verbose: bool,
}

impl LogWriter {
    /// Prints round, shutdown and failure events.
    #[must_use]
    pub fn new() -> Self {
        Self { verbose: false }
    }

    /// Additionally prints worker start/stop, answers and tally events.
    #[must_use]
    pub fn verbose() -> Self {
        Self { verbose: true }
    }

    fn render(&self, e: &Event) -> Option<String> {
        let worker = e.worker.as_deref().unwrap_or("unknown");
        let reason = e.reason.as_deref().unwrap_or("unknown");
        let question = e.question.as_deref().unwrap_or("");
        let line = match e.kind {
            EventKind::RoundDelivered => format!(
                "[delivered] player={} round={} question={question:?}",
                e.player.unwrap_or_default(),
                e.round.unwrap_or_default(),
            ),
            EventKind::ShutdownRequested => "[shutdown-requested]".to_string(),
            EventKind::AllStoppedWithin => "[all-stopped-within-grace]".to_string(),
            EventKind::GraceExceeded => format!("[grace-exceeded] stuck={reason}"),
            EventKind::WorkerFailed => format!("[failed] worker={worker:?} err={reason:?}"),
            EventKind::PublishFailed => format!(
                "[publish-failed] sink={worker:?} snapshot={} err={reason:?}",
                e.snapshot.unwrap_or_default()
            ),
            EventKind::SubscriberOverflow => {
                format!("[subscriber-overflow] subscriber={worker} reason={reason}")
            }
            EventKind::SubscriberPanicked => {
                format!("[subscriber-panicked] subscriber={worker} info={reason}")
            }
            _ if !self.verbose => return None,
            EventKind::WorkerStarting => format!("[starting] worker={worker:?}"),
            EventKind::WorkerStopped => format!("[stopped] worker={worker:?}"),
            EventKind::RoundGenerated => format!(
                "[round] round={} question={question:?}",
                e.round.unwrap_or_default()
            ),
            EventKind::AnswerSubmitted => format!(
                "[answer] player={} round={} choice={}",
                e.player.unwrap_or_default(),
                e.round.unwrap_or_default(),
                e.choice.unwrap_or_default(),
            ),
            EventKind::AnswerTallied => format!(
                "[tallied] round={} choice={} snapshot={}",
                e.round.unwrap_or_default(),
                e.choice.unwrap_or_default(),
                e.snapshot.unwrap_or_default(),
            ),
            EventKind::SnapshotPublished => format!(
                "[published] snapshot={} counts={reason}",
                e.snapshot.unwrap_or_default()
            ),
        };
        Some(line)
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        if let Some(line) = self.render(e) {
            println!("{line}");
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}

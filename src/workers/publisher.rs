//! # Publisher: surfaces tally snapshots.
//!
//! Takes snapshots from the tally in emission order and hands each one to
//! the configured [`Publish`] sink. A failing sink never stops the
//! pipeline: the error is logged, announced as `PublishFailed`, and the
//! worker moves on to the next snapshot.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::select;
use tokio_util::sync::CancellationToken;

use crate::channel::HandoffReceiver;
use crate::error::WorkerError;
use crate::events::{Bus, Event, EventKind};
use crate::game::TallySnapshot;
use crate::publishers::Publish;
use crate::workers::Worker;

/// Drives a [`Publish`] sink.
pub struct Publisher {
    input: HandoffReceiver<TallySnapshot>,
    sink: Arc<dyn Publish>,
    bus: Bus,
}

impl Publisher {
    /// Creates a publisher feeding `sink`.
    pub fn new(input: HandoffReceiver<TallySnapshot>, sink: Arc<dyn Publish>, bus: Bus) -> Self {
        Self { input, sink, bus }
    }
}

#[async_trait]
impl Worker for Publisher {
    fn name(&self) -> &str {
        "publisher"
    }

    async fn run(mut self, ctx: CancellationToken) -> Result<(), WorkerError> {
        loop {
            let snapshot = select! {
                biased;
                _ = ctx.cancelled() => return Err(WorkerError::Canceled),
                snapshot = self.input.recv() => match snapshot {
                    Some(snapshot) => snapshot,
                    None => return Ok(()),
                },
            };

            match self.sink.publish(&snapshot).await {
                Ok(()) => self.bus.publish(
                    Event::new(EventKind::SnapshotPublished)
                        .with_round(snapshot.round())
                        .with_snapshot(snapshot.seq())
                        .with_reason(snapshot.to_string()),
                ),
                Err(e) => {
                    tracing::warn!(
                        sink = self.sink.name(),
                        snapshot = snapshot.seq(),
                        error = %e,
                        label = e.as_label(),
                        "publish failed"
                    );
                    self.bus.publish(
                        Event::new(EventKind::PublishFailed)
                            .with_worker(self.sink.name())
                            .with_snapshot(snapshot.seq())
                            .with_reason(e.to_string()),
                    );
                }
            }
        }
    }
}

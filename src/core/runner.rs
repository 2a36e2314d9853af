//! # Run one pipeline worker to completion.
//!
//! Wraps a [`Worker`] with lifecycle events on the [`Bus`].
//!
//! ## Event flow
//!
//! ```text
//! Clean exit:
//!   publish WorkerStarting → worker.run() → Ok(())           → publish WorkerStopped
//!
//! Cancellation:
//!   publish WorkerStarting → worker.run() → Err(Canceled)    → publish WorkerStopped
//!
//! Failure:
//!   publish WorkerStarting → worker.run() → Err(other)       → publish WorkerFailed
//! ```
//!
//! ## Rules
//! - Always publishes **exactly one** terminal event: `WorkerStopped` or `WorkerFailed`
//! - `Canceled` is a graceful exit, not a failure
//! - No retries: a failed worker stays down, and its channel ends are dropped
//!   so neighbours observe closure

use tokio_util::sync::CancellationToken;

use crate::{
    error::WorkerError,
    events::{Bus, Event, EventKind},
    workers::Worker,
};

/// Runs `worker` under `ctx`, publishing lifecycle events to `bus`.
///
/// Returns the worker's own result so the caller can tell a clean drain
/// from a failure; the events have already been published either way.
pub(crate) async fn run_worker<W: Worker>(
    worker: W,
    ctx: CancellationToken,
    bus: Bus,
) -> Result<(), WorkerError> {
    let name = worker.name().to_string();
    bus.publish(Event::new(EventKind::WorkerStarting).with_worker(name.as_str()));

    let res = worker.run(ctx).await;
    match &res {
        Ok(()) | Err(WorkerError::Canceled) => publish_stopped(&bus, &name),
        Err(e) => {
            tracing::error!(worker = %name, error = %e, label = e.as_label(), "worker failed");
            publish_failed(&bus, &name, e);
        }
    }
    res
}

/// Publishes `WorkerStopped` (clean drain or graceful cancellation).
fn publish_stopped(bus: &Bus, name: &str) {
    bus.publish(Event::new(EventKind::WorkerStopped).with_worker(name));
}

/// Publishes `WorkerFailed` with error details.
fn publish_failed(bus: &Bus, name: &str, err: &WorkerError) {
    bus.publish(
        Event::new(EventKind::WorkerFailed)
            .with_worker(name)
            .with_reason(err.to_string()),
    );
}

//! # Event bus for broadcasting runtime events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that provides
//! non-blocking event publishing from multiple sources (workers, runner, supervisor).
//!
//! ## Architecture
//! ```text
//! Publishers (many):                    Subscriber (one per receiver):
//!   RoundSource ──┐
//!   Players     ──┼──────► Bus ───────► subscriber_listener ────► SubscriberSet
//!   Tally       ──┤  (broadcast chan)     (in Supervisor)
//!   Runner      ──┘
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks the pipeline.
//! - **Bounded capacity**: a single ring buffer stores recent events for all receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip `n` oldest items.
//! - **No persistence**: events are lost if there are no active subscribers at send time.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for runtime events.
///
/// Cheap to clone (internally holds an `Arc`-backed sender).
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (clamped to at least 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        Self { tx }
    }

    /// Publishes an event to all active subscribers.
    ///
    /// If there are no receivers, the event is dropped.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that will observe subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn receivers_only_see_events_after_subscribing() {
        let bus = Bus::new(8);
        bus.publish(Event::new(EventKind::ShutdownRequested));

        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::AllStoppedWithin));

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::AllStoppedWithin);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let bus = Bus::new(0);
        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::ShutdownRequested));
        assert!(rx.try_recv().is_ok());
    }
}

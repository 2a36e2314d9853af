//! # MemoryPublisher: in-memory snapshot sink
//!
//! Keeps every published snapshot and wakes waiters on each one, so
//! embedding code can observe the pipeline without scraping stdout.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::error::PublishError;
use crate::game::TallySnapshot;
use crate::publishers::Publish;

/// Collects snapshots in emission order.
#[derive(Default)]
pub struct MemoryPublisher {
    snapshots: Mutex<Vec<TallySnapshot>>,
    notify: Notify,
}

impl MemoryPublisher {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies of everything published so far.
    pub fn snapshots(&self) -> Vec<TallySnapshot> {
        self.snapshots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Most recent snapshot, if any.
    pub fn latest(&self) -> Option<TallySnapshot> {
        self.snapshots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    /// Number of snapshots published.
    pub fn len(&self) -> usize {
        self.snapshots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True if nothing was published.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Waits until at least `count` snapshots have been published.
    pub async fn wait_for(&self, count: usize) {
        loop {
            let notified = self.notify.notified();
            if self.len() >= count {
                return;
            }
            notified.await;
        }
    }
}

#[async_trait]
impl Publish for MemoryPublisher {
    async fn publish(&self, snapshot: &TallySnapshot) -> Result<(), PublishError> {
        self.snapshots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(snapshot.clone());
        self.notify.notify_waiters();
        Ok(())
    }

    fn name(&self) -> &'static str {
        "MemoryPublisher"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Answer, PlayerId, TallyState};
    use std::sync::Arc;

    #[tokio::test]
    async fn wait_for_wakes_on_publish() {
        let sink = Arc::new(MemoryPublisher::new());
        let waiter = {
            let sink = Arc::clone(&sink);
            tokio::spawn(async move { sink.wait_for(2).await })
        };

        let mut state = TallyState::default();
        let p = PlayerId::new(1).unwrap();
        sink.publish(&state.apply(&Answer::new(p, 1, 0)).unwrap()).await.unwrap();
        sink.publish(&state.apply(&Answer::new(p, 1, 0)).unwrap()).await.unwrap();

        waiter.await.unwrap();
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.latest().map(|s| s.count(0)), Some(2));
    }
}

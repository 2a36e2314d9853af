//! # Unbuffered handoff channel.
//!
//! [`handoff`] builds a rendezvous channel: [`HandoffSender::send`] resolves
//! only once the receiving side has taken the value out with
//! [`HandoffReceiver::recv`]. Pipeline stages use it so that a slow consumer
//! back-pressures its producer instead of letting work pile up in a buffer.
//!
//! ```text
//! sender ── Parcel{value, ack} ──► [mpsc(1)] ──► recv() ──┐
//!    ▲                                                     │
//!    └──────────────── oneshot ack ◄───────────────────────┘
//! ```
//!
//! ## Rules
//! - Senders are cloneable; many producers queue behind each other (fan-in).
//! - `recv()` is cancel-safe and may be used inside `tokio::select!`.
//! - Dropping a pending `send()` future abandons the handoff; if the parcel
//!   was already queued the receiver may still take it.
//! - `send()` fails with [`Disconnected`] once the receiver is dropped.

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

/// The receiving half was dropped before the value was taken.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("handoff receiver disconnected")]
pub struct Disconnected;

struct Parcel<T> {
    value: T,
    ack: oneshot::Sender<()>,
}

/// Sending half of a handoff channel.
pub struct HandoffSender<T> {
    tx: mpsc::Sender<Parcel<T>>,
}

impl<T> Clone for HandoffSender<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

/// Receiving half of a handoff channel.
pub struct HandoffReceiver<T> {
    rx: mpsc::Receiver<Parcel<T>>,
}

/// Creates a new unbuffered handoff channel.
pub fn handoff<T>() -> (HandoffSender<T>, HandoffReceiver<T>) {
    let (tx, rx) = mpsc::channel(1);
    (HandoffSender { tx }, HandoffReceiver { rx })
}

impl<T> HandoffSender<T> {
    /// Hands `value` to the receiver, waiting until it has been taken.
    pub async fn send(&self, value: T) -> Result<(), Disconnected> {
        let (ack, taken) = oneshot::channel();
        self.tx
            .send(Parcel { value, ack })
            .await
            .map_err(|_| Disconnected)?;
        taken.await.map_err(|_| Disconnected)
    }

    /// True once the receiver has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl<T> HandoffReceiver<T> {
    /// Takes the next value, acknowledging it to its sender.
    ///
    /// Returns `None` once every sender is dropped and nothing is queued.
    pub async fn recv(&mut self) -> Option<T> {
        let Parcel { value, ack } = self.rx.recv().await?;
        // The sender may have given up waiting; the value is still ours.
        let _ = ack.send(());
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn send_waits_for_the_receiver() {
        let (tx, mut rx) = handoff::<u32>();
        let pending = tokio::spawn(async move { tx.send(7).await });

        tokio::task::yield_now().await;
        assert!(!pending.is_finished());

        assert_eq!(rx.recv().await, Some(7));
        assert_eq!(pending.await.unwrap(), Ok(()));
    }

    #[tokio::test(start_paused = true)]
    async fn send_blocks_without_a_consumer() {
        let (tx, _rx) = handoff::<u32>();
        let res = timeout(Duration::from_secs(1), tx.send(1)).await;
        assert!(res.is_err(), "send must not complete before recv");
    }

    #[tokio::test]
    async fn dropped_receiver_disconnects_senders() {
        let (tx, rx) = handoff::<u32>();
        drop(rx);
        assert!(tx.is_closed());
        assert_eq!(tx.send(1).await, Err(Disconnected));
    }

    #[tokio::test]
    async fn recv_ends_when_all_senders_are_gone() {
        let (tx, mut rx) = handoff::<u32>();
        drop(tx);
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn concurrent_senders_lose_nothing() {
        let (tx, mut rx) = handoff::<u32>();
        let mut senders = Vec::new();
        for i in 0..16 {
            let tx = tx.clone();
            senders.push(tokio::spawn(async move { tx.send(i).await }));
        }
        drop(tx);

        let mut got = Vec::new();
        while let Some(v) = rx.recv().await {
            got.push(v);
        }
        got.sort_unstable();
        assert_eq!(got, (0..16).collect::<Vec<_>>());
        for s in senders {
            assert_eq!(s.await.unwrap(), Ok(()));
        }
    }
}

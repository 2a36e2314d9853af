//! # RoundSource: periodic round generator.
//!
//! Waits one full interval, picks a catalog question uniformly at random,
//! hands the [`Round`] to the broadcaster, and repeats.
//!
//! ```text
//! loop {
//!   ├─► stop if the round limit is reached (closes the output)
//!   ├─► select { tick | cancelled }
//!   ├─► seq += 1; pick question
//!   ├─► publish RoundGenerated
//!   └─► select { out.send(round) | cancelled }   (back-pressure, no buffer)
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use tokio::select;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::channel::HandoffSender;
use crate::error::WorkerError;
use crate::events::{Bus, Event, EventKind};
use crate::game::{Catalog, Round};
use crate::workers::{Worker, seeded_rng};

/// Emits one [`Round`] per interval tick.
pub struct RoundSource {
    catalog: Catalog,
    interval: Duration,
    limit: Option<u64>,
    rng: StdRng,
    out: HandoffSender<Round>,
    bus: Bus,
}

impl RoundSource {
    /// Creates an unlimited source with an OS-seeded random generator.
    pub fn new(catalog: Catalog, interval: Duration, out: HandoffSender<Round>, bus: Bus) -> Self {
        Self {
            catalog,
            interval,
            limit: None,
            rng: seeded_rng(None, 0),
            out,
            bus,
        }
    }

    /// Stops after `limit` rounds (`None` = unlimited).
    pub fn with_limit(mut self, limit: Option<u64>) -> Self {
        self.limit = limit;
        self
    }

    /// Replaces the random generator.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }
}

#[async_trait]
impl Worker for RoundSource {
    fn name(&self) -> &str {
        "round-source"
    }

    async fn run(mut self, ctx: CancellationToken) -> Result<(), WorkerError> {
        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut seq: u64 = 0;

        loop {
            if self.limit.is_some_and(|limit| seq >= limit) {
                tracing::debug!(rounds = seq, "round limit reached");
                return Ok(());
            }

            select! {
                biased;
                _ = ctx.cancelled() => return Err(WorkerError::Canceled),
                _ = ticker.tick() => {}
            }

            seq += 1;
            let round = Round::new(seq, self.catalog.pick(&mut self.rng));
            tracing::debug!(round = seq, question = round.question(), "round generated");
            self.bus.publish(
                Event::new(EventKind::RoundGenerated)
                    .with_round(seq)
                    .with_question(round.question()),
            );

            select! {
                biased;
                _ = ctx.cancelled() => return Err(WorkerError::Canceled),
                res = self.out.send(round) => res.map_err(|_| WorkerError::disconnected("rounds"))?,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::handoff;
    use rand::SeedableRng;

    fn catalog() -> Catalog {
        Catalog::from_pairs([("2+2?", ["3", "4", "5", "6"])]).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn first_round_arrives_after_one_interval() {
        let (tx, mut rx) = handoff();
        let source = RoundSource::new(catalog(), Duration::from_secs(10), tx, Bus::new(8))
            .with_limit(Some(2))
            .with_rng(StdRng::seed_from_u64(7));
        let started = Instant::now();
        let handle = tokio::spawn(source.run(CancellationToken::new()));

        let first = rx.recv().await.unwrap();
        assert_eq!(first.seq(), 1);
        assert_eq!(first.question(), "2+2?");
        assert!(started.elapsed() >= Duration::from_secs(10));

        let second = rx.recv().await.unwrap();
        assert_eq!(second.seq(), 2);
        assert!(started.elapsed() >= Duration::from_secs(20));

        assert!(rx.recv().await.is_none());
        assert_eq!(handle.await.unwrap(), Ok(()));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_before_first_tick_emits_nothing() {
        let (tx, mut rx) = handoff();
        let bus = Bus::new(8);
        let mut events = bus.subscribe();
        let ctx = CancellationToken::new();
        let handle = tokio::spawn(
            RoundSource::new(catalog(), Duration::from_secs(10), tx, bus).run(ctx.clone()),
        );

        ctx.cancel();
        assert_eq!(handle.await.unwrap(), Err(WorkerError::Canceled));
        assert!(rx.recv().await.is_none());
        assert!(events.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn blocked_emission_yields_to_cancellation() {
        let (tx, _rx) = handoff();
        let ctx = CancellationToken::new();
        let handle = tokio::spawn(
            RoundSource::new(catalog(), Duration::from_secs(1), tx, Bus::new(8)).run(ctx.clone()),
        );

        time::sleep(Duration::from_secs(5)).await;
        assert!(!handle.is_finished());
        ctx.cancel();
        assert_eq!(handle.await.unwrap(), Err(WorkerError::Canceled));
    }

    #[tokio::test]
    async fn dropped_consumer_is_reported() {
        let (tx, rx) = handoff();
        drop(rx);
        let res = RoundSource::new(catalog(), Duration::from_millis(1), tx, Bus::new(8))
            .run(CancellationToken::new())
            .await;
        assert_eq!(res, Err(WorkerError::disconnected("rounds")));
    }
}

//! # Tally: serialized fan-in of answers.
//!
//! All players share one answer channel; the tally takes answers one at a
//! time, applies each to its private [`TallyState`], and hands the resulting
//! snapshot to the publisher. While a snapshot emission is blocked, further
//! answers wait in the channel behind it; nothing is dropped.
//!
//! ## Rules
//! - An answer that has been taken off the channel is always applied, even
//!   if cancellation arrives immediately after.
//! - In [`TallyMode::PerRound`], an answer to a round older than the one
//!   being counted is discarded: no event, no snapshot.
//! - Counts are never touched outside this loop.

use async_trait::async_trait;
use tokio::select;
use tokio_util::sync::CancellationToken;

use crate::channel::{HandoffReceiver, HandoffSender};
use crate::error::WorkerError;
use crate::events::{Bus, Event, EventKind};
use crate::game::{Answer, TallyMode, TallySnapshot, TallyState};
use crate::workers::Worker;

/// Owns the running counts.
pub struct Tally {
    state: TallyState,
    input: HandoffReceiver<Answer>,
    out: HandoffSender<TallySnapshot>,
    bus: Bus,
}

impl Tally {
    /// Creates an empty tally.
    pub fn new(
        mode: TallyMode,
        input: HandoffReceiver<Answer>,
        out: HandoffSender<TallySnapshot>,
        bus: Bus,
    ) -> Self {
        Self {
            state: TallyState::new(mode),
            input,
            out,
            bus,
        }
    }

    async fn next(&mut self, ctx: &CancellationToken) -> Result<Option<Answer>, WorkerError> {
        select! {
            biased;
            _ = ctx.cancelled() => Err(WorkerError::Canceled),
            answer = self.input.recv() => Ok(answer),
        }
    }
}

#[async_trait]
impl Worker for Tally {
    fn name(&self) -> &str {
        "tally"
    }

    async fn run(mut self, ctx: CancellationToken) -> Result<(), WorkerError> {
        let res = loop {
            let answer = match self.next(&ctx).await {
                Ok(Some(answer)) => answer,
                Ok(None) => break Ok(()),
                Err(e) => break Err(e),
            };

            let Some(snapshot) = self.state.apply(&answer) else {
                tracing::debug!(
                    player = %answer.player(),
                    round = answer.round(),
                    "late answer discarded"
                );
                continue;
            };
            self.bus.publish(
                Event::new(EventKind::AnswerTallied)
                    .with_player(answer.player())
                    .with_round(answer.round())
                    .with_choice(answer.choice())
                    .with_snapshot(snapshot.seq()),
            );

            select! {
                biased;
                _ = ctx.cancelled() => break Err(WorkerError::Canceled),
                res = self.out.send(snapshot) => {
                    if res.is_err() {
                        break Err(WorkerError::disconnected("snapshots"));
                    }
                }
            }
        };

        tracing::debug!(
            applied = self.state.applied(),
            total = self.state.total(),
            "tally closed"
        );
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::handoff;
    use crate::game::PlayerId;
    use std::time::Duration;

    #[tokio::test]
    async fn concurrent_answers_are_all_counted() {
        let (answer_tx, answer_rx) = handoff();
        let (snap_tx, mut snap_rx) = handoff();
        let handle = tokio::spawn(
            Tally::new(TallyMode::Cumulative, answer_rx, snap_tx, Bus::new(64))
                .run(CancellationToken::new()),
        );

        let mut players = Vec::new();
        for id in 1..=8u32 {
            let tx = answer_tx.clone();
            players.push(tokio::spawn(async move {
                for round in 1..=4u64 {
                    let answer = Answer::new(PlayerId::new(id).unwrap(), round, (id % 3) as usize);
                    tx.send(answer).await.unwrap();
                }
            }));
        }
        drop(answer_tx);

        let mut snapshots = Vec::new();
        while let Some(snap) = snap_rx.recv().await {
            snapshots.push(snap);
        }
        for p in players {
            p.await.unwrap();
        }
        assert_eq!(handle.await.unwrap(), Ok(()));

        assert_eq!(snapshots.len(), 32);
        for (i, snap) in snapshots.iter().enumerate() {
            assert_eq!(snap.seq(), i as u64 + 1);
            assert_eq!(snap.total(), i as u64 + 1);
        }
        let last = snapshots.last().unwrap();
        // ids 3,6 → 0; 1,4,7 → 1; 2,5,8 → 2; four rounds each
        assert_eq!(last.count(0), 8);
        assert_eq!(last.count(1), 12);
        assert_eq!(last.count(2), 12);
    }

    #[tokio::test(start_paused = true)]
    async fn blocked_publisher_holds_answers_without_losing_them() {
        let (answer_tx, answer_rx) = handoff();
        let (snap_tx, mut snap_rx) = handoff();
        let handle = tokio::spawn(
            Tally::new(TallyMode::Cumulative, answer_rx, snap_tx, Bus::new(64))
                .run(CancellationToken::new()),
        );

        let p = PlayerId::new(1).unwrap();
        let sender = tokio::spawn(async move {
            for choice in 0..3 {
                answer_tx.send(Answer::new(p, 1, choice)).await.unwrap();
            }
        });

        // Nobody reads snapshots for a while: the tally sits on the first one.
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(!sender.is_finished());

        let mut totals = Vec::new();
        while let Some(snap) = snap_rx.recv().await {
            totals.push(snap.total());
        }
        sender.await.unwrap();
        assert_eq!(handle.await.unwrap(), Ok(()));
        assert_eq!(totals, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn per_round_tally_skips_late_answers() {
        let (answer_tx, answer_rx) = handoff();
        let (snap_tx, mut snap_rx) = handoff();
        let bus = Bus::new(64);
        let mut events = bus.subscribe();
        let handle = tokio::spawn(
            Tally::new(TallyMode::PerRound, answer_rx, snap_tx, bus)
                .run(CancellationToken::new()),
        );

        let sender = tokio::spawn(async move {
            let p = |id| PlayerId::new(id).unwrap();
            answer_tx.send(Answer::new(p(1), 1, 0)).await.unwrap();
            answer_tx.send(Answer::new(p(1), 2, 1)).await.unwrap();
            answer_tx.send(Answer::new(p(2), 1, 0)).await.unwrap();
            answer_tx.send(Answer::new(p(2), 2, 1)).await.unwrap();
        });

        let mut snapshots = Vec::new();
        while let Some(snap) = snap_rx.recv().await {
            snapshots.push(snap);
        }
        sender.await.unwrap();
        assert_eq!(handle.await.unwrap(), Ok(()));

        let seen: Vec<(u64, u64)> = snapshots.iter().map(|s| (s.round(), s.total())).collect();
        assert_eq!(seen, vec![(1, 1), (2, 1), (2, 2)]);
        assert_eq!(snapshots.last().unwrap().count(0), 0);

        let mut tallied = 0;
        while let Ok(ev) = events.try_recv() {
            if ev.kind == EventKind::AnswerTallied {
                tallied += 1;
            }
        }
        assert_eq!(tallied, 3);
    }

    #[tokio::test]
    async fn cancellation_stops_accepting_answers() {
        let (answer_tx, answer_rx) = handoff::<Answer>();
        let (snap_tx, _snap_rx) = handoff();
        let ctx = CancellationToken::new();
        ctx.cancel();

        let res = Tally::new(TallyMode::Cumulative, answer_rx, snap_tx, Bus::new(8))
            .run(ctx)
            .await;
        assert_eq!(res, Err(WorkerError::Canceled));
        assert!(answer_tx.is_closed());
    }
}

//! # Broadcaster: sequential fan-out of rounds to every player.
//!
//! For each incoming [`Round`] the broadcaster walks the registered player
//! channels in id order and hands each one the same round. A round counts as
//! delivered only once every player has taken it; a slow player delays the
//! players after it, never the ones before.
//!
//! With zero players every round is accepted and dropped.

use async_trait::async_trait;
use tokio::select;
use tokio_util::sync::CancellationToken;

use crate::channel::{HandoffReceiver, HandoffSender};
use crate::error::WorkerError;
use crate::game::{PlayerId, Round};
use crate::workers::Worker;

/// Fans rounds out to the fixed player set.
pub struct Broadcaster {
    input: HandoffReceiver<Round>,
    players: Vec<(PlayerId, HandoffSender<Round>)>,
}

impl Broadcaster {
    /// Creates a broadcaster over `players`, delivered in id order.
    pub fn new(input: HandoffReceiver<Round>, mut players: Vec<(PlayerId, HandoffSender<Round>)>) -> Self {
        players.sort_by_key(|(id, _)| *id);
        Self { input, players }
    }

    /// Number of registered players.
    pub fn fan_out(&self) -> usize {
        self.players.len()
    }
}

#[async_trait]
impl Worker for Broadcaster {
    fn name(&self) -> &str {
        "broadcaster"
    }

    async fn run(mut self, ctx: CancellationToken) -> Result<(), WorkerError> {
        loop {
            let round = select! {
                biased;
                _ = ctx.cancelled() => return Err(WorkerError::Canceled),
                round = self.input.recv() => match round {
                    Some(round) => round,
                    None => return Ok(()),
                },
            };

            for (player, tx) in &self.players {
                select! {
                    biased;
                    _ = ctx.cancelled() => {
                        tracing::debug!(round = round.seq(), %player, "fan-out abandoned");
                        return Err(WorkerError::Canceled);
                    }
                    res = tx.send(round.clone()) => res.map_err(|_| WorkerError::disconnected("deliveries"))?,
                }
            }
            tracing::trace!(round = round.seq(), players = self.players.len(), "round fanned out");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::handoff;
    use crate::game::Question;
    use std::sync::Arc;

    fn round(seq: u64) -> Round {
        let q = Question::new(format!("q{seq}"), ["a", "b"]).unwrap();
        Round::new(seq, Arc::new(q))
    }

    #[tokio::test]
    async fn every_player_sees_every_round_in_order() {
        const PLAYERS: u32 = 3;
        const ROUNDS: u64 = 5;

        let (round_tx, round_rx) = handoff();
        let mut outputs = Vec::new();
        let mut readers = Vec::new();
        for id in 1..=PLAYERS {
            let (tx, mut rx) = handoff::<Round>();
            outputs.push((PlayerId::new(id).unwrap(), tx));
            readers.push(tokio::spawn(async move {
                let mut seen = Vec::new();
                while let Some(r) = rx.recv().await {
                    seen.push(r.seq());
                }
                seen
            }));
        }

        let broadcaster = Broadcaster::new(round_rx, outputs);
        assert_eq!(broadcaster.fan_out(), PLAYERS as usize);
        let handle = tokio::spawn(broadcaster.run(CancellationToken::new()));

        for seq in 1..=ROUNDS {
            round_tx.send(round(seq)).await.unwrap();
        }
        drop(round_tx);
        assert_eq!(handle.await.unwrap(), Ok(()));

        for reader in readers {
            assert_eq!(reader.await.unwrap(), (1..=ROUNDS).collect::<Vec<_>>());
        }
    }

    #[tokio::test]
    async fn zero_players_is_a_no_op() {
        let (round_tx, round_rx) = handoff();
        let handle = tokio::spawn(Broadcaster::new(round_rx, Vec::new()).run(CancellationToken::new()));

        round_tx.send(round(1)).await.unwrap();
        round_tx.send(round(2)).await.unwrap();
        drop(round_tx);
        assert_eq!(handle.await.unwrap(), Ok(()));
    }

    #[tokio::test]
    async fn stalled_player_does_not_block_shutdown() {
        let (round_tx, round_rx) = handoff();
        let (fast_tx, mut fast_rx) = handoff();
        let (slow_tx, _slow_rx) = handoff();
        let players = vec![
            (PlayerId::new(2).unwrap(), slow_tx),
            (PlayerId::new(1).unwrap(), fast_tx),
        ];
        let ctx = CancellationToken::new();
        let handle = tokio::spawn(Broadcaster::new(round_rx, players).run(ctx.clone()));

        round_tx.send(round(1)).await.unwrap();
        // Player 1 is served first even though it was registered second.
        assert_eq!(fast_rx.recv().await.map(|r| r.seq()), Some(1));

        ctx.cancel();
        assert_eq!(handle.await.unwrap(), Err(WorkerError::Canceled));
    }
}

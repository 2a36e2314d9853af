//! # PlayerWorker: one simulated participant.
//!
//! Receives every round from its private delivery channel and submits
//! exactly one [`Answer`] per round to the shared tally channel. The choice
//! comes from a [`Chooser`]; the default [`RandomChooser`] picks uniformly
//! among the round's options.

use async_trait::async_trait;
use rand::Rng;
use rand::rngs::StdRng;
use tokio::select;
use tokio_util::sync::CancellationToken;

use crate::channel::{HandoffReceiver, HandoffSender};
use crate::error::WorkerError;
use crate::events::{Bus, Event, EventKind};
use crate::game::{Answer, PlayerId, Round};
use crate::workers::Worker;

/// Decides a player's answer to a round.
///
/// Must return an index into `round.options()`; anything else stops the
/// player with [`WorkerError::InvalidChoice`].
pub trait Chooser: Send + 'static {
    /// Picks an option index for `round`.
    fn choose(&mut self, player: PlayerId, round: &Round) -> usize;
}

/// Uniformly random answers.
pub struct RandomChooser {
    rng: StdRng,
}

impl RandomChooser {
    /// Chooser drawing from `rng`.
    pub fn new(rng: StdRng) -> Self {
        Self { rng }
    }
}

impl Chooser for RandomChooser {
    fn choose(&mut self, _player: PlayerId, round: &Round) -> usize {
        self.rng.random_range(0..round.option_count())
    }
}

/// Answers every delivered round once.
pub struct PlayerWorker {
    id: PlayerId,
    name: String,
    input: HandoffReceiver<Round>,
    answers: HandoffSender<Answer>,
    chooser: Box<dyn Chooser>,
    bus: Bus,
}

impl PlayerWorker {
    /// Creates player `id`.
    pub fn new(
        id: PlayerId,
        input: HandoffReceiver<Round>,
        answers: HandoffSender<Answer>,
        chooser: Box<dyn Chooser>,
        bus: Bus,
    ) -> Self {
        Self {
            id,
            name: format!("player-{id}"),
            input,
            answers,
            chooser,
            bus,
        }
    }

    /// Player identity.
    pub fn id(&self) -> PlayerId {
        self.id
    }
}

#[async_trait]
impl Worker for PlayerWorker {
    fn name(&self) -> &str {
        &self.name
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

            tracing::info!(player = %self.id, round = round.seq(), question = round.question(), "round delivered");
            self.bus.publish(
                Event::new(EventKind::RoundDelivered)
                    .with_worker(self.name.as_str())
                    .with_player(self.id)
                    .with_round(round.seq())
                    .with_question(round.question()),
            );

            let choice = self.chooser.choose(self.id, &round);
            if round.option(choice).is_none() {
                return Err(WorkerError::InvalidChoice {
                    player: self.id.get(),
                    choice,
                    options: round.option_count(),
                });
            }
            let answer = Answer::new(self.id, round.seq(), choice);

            select! {
                biased;
                _ = ctx.cancelled() => return Err(WorkerError::Canceled),
                res = self.answers.send(answer) => res.map_err(|_| WorkerError::disconnected("answers"))?,
            }
            self.bus.publish(
                Event::new(EventKind::AnswerSubmitted)
                    .with_player(self.id)
                    .with_round(round.seq())
                    .with_choice(choice),
            );
        }
    }
}

//! # Supervisor: wires the trivia pipeline and drives its shutdown.
//!
//! The [`Supervisor`] owns the event bus, the subscriber list, the snapshot
//! sink and the shared cancellation token. [`Supervisor::run`] creates every
//! handoff channel, spawns one task per worker, and returns once the pipeline
//! has stopped.
//!
//! ## High-level architecture
//! ```text
//! Preparation:
//!   subscriber_listener(): Bus.subscribe() ─► AliveTracker::update(&Event)
//!                                          └► SubscriberSet::emit(&Event)   (fire-and-forget)
//!
//! Spawn (consumers first, each with runtime_token.child_token()):
//!   Publisher          (own JoinHandle, joined best-effort)
//!   PlayerWorker × N ┐
//!   Tally            ├─ JoinSet
//!   Broadcaster      │
//!   RoundSource      ┘
//!
//! Stop paths:
//!   a) stop future completes   ─► ShutdownHandle::trigger()
//!   b) ShutdownHandle triggered elsewhere
//!        └─► runtime_token.cancel() → propagates to child tokens
//!        └─► wait_all_with_grace(cfg.grace):
//!               ├─ Ok (all joined)  → Bus.publish(AllStoppedWithin)
//!               └─ Timeout exceeded → abort_all, Bus.publish(GraceExceeded)
//!                                     (AliveTracker.snapshot() for stuck workers)
//!   c) source reached max_rounds → pipeline drains on its own, no cancel
//! ```
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use triviavisor::{Catalog, Config, MemoryPublisher, Supervisor};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config {
//!         players: 3,
//!         interval: Duration::from_millis(10),
//!         max_rounds: 2,
//!         seed: Some(7),
//!         ..Config::default()
//!     };
//!     let sink = Arc::new(MemoryPublisher::new());
//!
//!     let sup = Supervisor::builder(cfg)
//!         .with_catalog(Catalog::from_pairs([("2+2?", ["3", "4", "5", "6"])])?)
//!         .with_publisher(sink.clone())
//!         .build()?;
//!
//!     sup.run().await?;
//!     assert_eq!(sink.latest().map(|s| s.total()), Some(6));
//!     Ok(())
//! }
//! ```

use std::future::{Future, pending};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tokio::task::{JoinHandle, JoinSet};
use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::{
    channel::handoff,
    core::{Config, runner::run_worker},
    error::{RuntimeError, WorkerError},
    events::{Bus, Event, EventKind},
    game::Catalog,
    publishers::Publish,
    subscribers::{Subscribe, SubscriberSet},
    workers::{Broadcaster, PlayerWorker, Publisher, RoundSource, Tally, Worker, seeded_rng},
};

use super::{
    alive::AliveTracker,
    builder::{ChooserFactory, SupervisorBuilder},
    shutdown::ShutdownHandle,
};

type WorkerSet = JoinSet<Result<(), WorkerError>>;

/// Coordinates the pipeline workers, event delivery and graceful shutdown.
pub struct Supervisor {
    pub(super) cfg: Config,
    pub(super) catalog: Catalog,
    pub(super) bus: Bus,
    /// Taken by the first `run`; the subscriber set lives inside the listener.
    pub(super) subscribers: Mutex<Vec<Arc<dyn Subscribe>>>,
    pub(super) publisher: Arc<dyn Publish>,
    pub(super) chooser: ChooserFactory,
    pub(super) alive: Arc<AliveTracker>,
    pub(super) shutdown: ShutdownHandle,
    pub(super) started: AtomicBool,
}

impl Supervisor {
    /// Starts building a supervisor with the given configuration.
    pub fn builder(cfg: Config) -> SupervisorBuilder {
        SupervisorBuilder::new(cfg)
    }

    /// Active configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Cloneable trigger that stops the pipeline.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Requests shutdown. Returns `false` if it was already requested.
    pub fn shutdown(&self) -> bool {
        self.shutdown.trigger()
    }

    /// Creates a receiver for every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Runs the pipeline until it is shut down through a [`ShutdownHandle`]
    /// or drains on its own (`Config::max_rounds`).
    pub async fn run(&self) -> Result<(), RuntimeError> {
        self.run_until(pending()).await
    }

    /// Like [`run`](Self::run), additionally triggering shutdown when `stop`
    /// completes.
    ///
    /// May be called once; later calls return [`RuntimeError::AlreadyStarted`].
    pub async fn run_until<F>(&self, stop: F) -> Result<(), RuntimeError>
    where
        F: Future<Output = ()>,
    {
        if self.started.swap(true, Ordering::AcqRel) {
            return Err(RuntimeError::AlreadyStarted);
        }

        let token = self.shutdown.token().clone();
        let listener_stop = CancellationToken::new();
        let listener = self.subscriber_listener(listener_stop.clone());

        let mut set = WorkerSet::new();
        let publisher = self.spawn_pipeline(&mut set, &token);
        tracing::info!(
            players = self.cfg.players,
            interval = ?self.cfg.interval,
            max_rounds = self.cfg.max_rounds,
            "game started"
        );

        let res = self.drive_shutdown(&mut set, &token, stop).await;
        self.join_publisher(publisher).await;

        listener_stop.cancel();
        if time::timeout(self.cfg.grace, listener).await.is_err() {
            tracing::warn!("subscriber listener did not finish within grace");
        }
        res
    }

    /// Subscribes to the bus and forwards events to the alive tracker and
    /// the subscriber set. After `stop`, already-buffered events are still
    /// delivered before the subscriber queues are closed.
    fn subscriber_listener(&self, stop: CancellationToken) -> JoinHandle<()> {
        let mut rx = self.bus.subscribe();
        let subs = std::mem::take(
            &mut *self
                .subscribers
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        let set = SubscriberSet::new(subs, self.bus.clone());
        let alive = Arc::clone(&self.alive);

        tokio::spawn(async move {
            loop {
                select! {
                    biased;
                    _ = stop.cancelled() => break,
                    ev = rx.recv() => match ev {
                        Ok(ev) => {
                            alive.update(&ev).await;
                            set.emit(&ev);
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "event listener lagged");
                        }
                        Err(RecvError::Closed) => break,
                    },
                }
            }
            loop {
                match rx.try_recv() {
                    Ok(ev) => {
                        alive.update(&ev).await;
                        set.emit(&ev);
                    }
                    Err(TryRecvError::Lagged(_)) => continue,
                    Err(_) => break,
                }
            }
            set.shutdown().await;
        })
    }

    /// Creates the handoff channels and spawns every worker. Consumers are
    /// spawned before their producers. Returns the publisher's handle.
    fn spawn_pipeline(
        &self,
        set: &mut WorkerSet,
        runtime_token: &CancellationToken,
    ) -> JoinHandle<Result<(), WorkerError>> {
        let (round_tx, round_rx) = handoff();
        let (answer_tx, answer_rx) = handoff();
        let (snapshot_tx, snapshot_rx) = handoff();

        let publisher = tokio::spawn(run_worker(
            Publisher::new(snapshot_rx, Arc::clone(&self.publisher), self.bus.clone()),
            runtime_token.child_token(),
            self.bus.clone(),
        ));

        let mut deliveries = Vec::with_capacity(self.cfg.players);
        for id in self.cfg.player_ids() {
            let (tx, rx) = handoff();
            deliveries.push((id, tx));
            let player = PlayerWorker::new(
                id,
                rx,
                answer_tx.clone(),
                (self.chooser)(id),
                self.bus.clone(),
            );
            self.spawn_worker(set, player, runtime_token);
        }
        // Players hold the only answer senders: the tally drains once they exit.
        drop(answer_tx);

        let tally = Tally::new(
            self.cfg.tally_mode,
            answer_rx,
            snapshot_tx,
            self.bus.clone(),
        );
        self.spawn_worker(set, tally, runtime_token);
        self.spawn_worker(set, Broadcaster::new(round_rx, deliveries), runtime_token);

        let source = RoundSource::new(
            self.catalog.clone(),
            self.cfg.interval,
            round_tx,
            self.bus.clone(),
        )
        .with_limit(self.cfg.round_limit())
        .with_rng(seeded_rng(self.cfg.seed, 0));
        self.spawn_worker(set, source, runtime_token);

        publisher
    }

    fn spawn_worker<W: Worker>(
        &self,
        set: &mut WorkerSet,
        worker: W,
        runtime_token: &CancellationToken,
    ) {
        set.spawn(run_worker(
            worker,
            runtime_token.child_token(),
            self.bus.clone(),
        ));
    }

    /// Waits until the pipeline drains on its own or shutdown is requested.
    async fn drive_shutdown<F>(
        &self,
        set: &mut WorkerSet,
        runtime_token: &CancellationToken,
        stop: F,
    ) -> Result<(), RuntimeError>
    where
        F: Future<Output = ()>,
    {
        let interrupted = select! {
            biased;
            _ = runtime_token.cancelled() => true,
            _ = stop => {
                self.shutdown.trigger();
                true
            }
            _ = join_all(set) => false,
        };

        if interrupted {
            self.wait_all_with_grace(set).await
        } else {
            tracing::info!("pipeline drained");
            Ok(())
        }
    }

    /// Waits for all workers (except the publisher) to finish within the
    /// configured grace period.
    ///
    /// Publishes [`EventKind::AllStoppedWithin`] on success, or
    /// [`EventKind::GraceExceeded`] on timeout, aborting the remaining
    /// workers and returning [`RuntimeError::GraceExceeded`] with their names.
    async fn wait_all_with_grace(&self, set: &mut WorkerSet) -> Result<(), RuntimeError> {
        let grace = self.cfg.grace;
        let timed = time::timeout(grace, join_all(set)).await;

        match timed {
            Ok(()) => {
                self.bus.publish(Event::new(EventKind::AllStoppedWithin));
                tracing::info!("all workers stopped within grace");
                Ok(())
            }
            Err(_) => {
                let stuck = self.alive.snapshot().await;
                set.abort_all();
                tracing::error!(?grace, ?stuck, "shutdown grace exceeded");
                self.bus
                    .publish(Event::new(EventKind::GraceExceeded).with_reason(stuck.join(", ")));
                Err(RuntimeError::GraceExceeded { grace, stuck })
            }
        }
    }

    /// Best-effort join of the publisher, bounded by the grace period.
    async fn join_publisher(&self, mut handle: JoinHandle<Result<(), WorkerError>>) {
        if time::timeout(self.cfg.grace, &mut handle).await.is_err() {
            tracing::warn!(grace = ?self.cfg.grace, "publisher did not stop in time; aborting");
            handle.abort();
        }
    }
}

/// Joins every task in `set`. Worker results were already published by the
/// runner; only panics are reported here.
async fn join_all(set: &mut WorkerSet) {
    while let Some(res) = set.join_next().await {
        if let Err(e) = res {
            if e.is_panic() {
                tracing::error!(error = %e, "worker panicked");
            }
        }
    }
}

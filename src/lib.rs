//! # triviavisor
//!
//! **Triviavisor** runs a supervised trivia pipeline on tokio.
//!
//! A generator emits a question round at a fixed interval, every round is
//! fanned out to N simulated players, each player answers independently,
//! the answers are funneled into a single tally, and every updated tally
//! snapshot is published. One supervisor owns the wiring and the shutdown.
//!
//! ## Architecture
//! ### Overview
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Supervisor (runtime orchestrator)                                │
//! │  - Bus (broadcast events)                                         │
//! │  - AliveTracker (tracks worker state with sequence numbers)       │
//! │  - SubscriberSet (fans out to user subscribers)                   │
//! │  - ShutdownHandle (one shared CancellationToken)                  │
//! └──────┬────────────────────────────────────────────────────────────┘
//!        │ spawns, one task each
//!        ▼
//!  RoundSource ─► Broadcaster ─┬─► PlayerWorker(1) ─┐
//!   (interval)     (fan-out)   ├─► PlayerWorker(2) ─┼─► Tally ─► Publisher ─► Publish sink
//!                              └─► PlayerWorker(N) ─┘  (fan-in)
//!
//!  every arrow is an unbuffered handoff channel: a send completes only
//!  once the next stage has taken the value
//!
//!  Workers publish events:            ┌────────────────────────┐
//!  - RoundGenerated / RoundDelivered  │  subscriber_listener   │
//!  - AnswerSubmitted / AnswerTallied ─►  (in Supervisor)       │
//!  - SnapshotPublished / ...          └───┬────────────────┬───┘
//!                                         ▼                ▼
//!                                  AliveTracker     SubscriberSet
//!                                                   (per-sub queues)
//! ```
//!
//! ### Lifecycle
//! ```text
//! Supervisor::run()
//!   ├─► spawn consumers before producers
//!   ├─► wait for one of:
//!   │     ├─ ShutdownHandle::trigger() / stop future  ─► cancel token
//!   │     │                                              wait up to Config::grace
//!   │     │                                              ├─ AllStoppedWithin
//!   │     │                                              └─ GraceExceeded (abort)
//!   │     └─ Config::max_rounds reached ─► stages close one after another
//!   └─► join the publisher (best effort), flush subscribers
//! ```
//!
//! ## Features
//! | Area              | Description                                                 | Key types / traits                          |
//! |-------------------|-------------------------------------------------------------|---------------------------------------------|
//! | **Game model**    | Questions, rounds, answers and running counts.              | [`Catalog`], [`Round`], [`TallySnapshot`]   |
//! | **Supervision**   | Wire the pipeline, stop it gracefully.                      | [`Supervisor`], [`ShutdownHandle`]          |
//! | **Publishing**    | Where snapshots go.                                         | [`Publish`], [`LogPublisher`]               |
//! | **Subscriber API**| Hook into runtime events (logging, custom subscribers).     | [`Subscribe`], [`LogWriter`]                |
//! | **Errors**        | Typed errors for the runtime, workers and sinks.            | [`RuntimeError`], [`WorkerError`]           |
//! | **Configuration** | Centralize runtime settings.                                | [`Config`]                                  |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use triviavisor::{Config, LogWriter, MemoryPublisher, Subscribe, Supervisor};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config {
//!         players: 2,
//!         interval: Duration::from_millis(5),
//!         ..Config::default()
//!     };
//!     let sink = Arc::new(MemoryPublisher::new());
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
//!
//!     let sup = Supervisor::builder(cfg)
//!         .with_subscribers(subs)
//!         .with_publisher(sink.clone())
//!         .build()?;
//!
//!     // Stop once the first round has been answered by both players.
//!     let waiter = Arc::clone(&sink);
//!     sup.run_until(async move { waiter.wait_for(2).await }).await?;
//!     assert!(sink.len() >= 2);
//!     Ok(())
//! }
//! ```
pub mod channel;
mod core;
mod error;
mod events;
mod game;
mod publishers;
mod subscribers;
pub mod workers;

// ---- Public re-exports ----

pub use crate::core::{
    ChooserFactory, Config, ShutdownHandle, Supervisor, SupervisorBuilder, wait_for_operator,
    wait_for_shutdown_signal,
};
pub use error::{CatalogError, ConfigError, PublishError, RuntimeError, WorkerError};
pub use events::{Bus, Event, EventKind};
pub use game::{Answer, Catalog, PlayerId, Question, Round, TallyMode, TallySnapshot, TallyState};
pub use publishers::{LogPublisher, MemoryPublisher, Publish};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};

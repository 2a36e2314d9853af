//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to runtime events emitted by the supervisor, the worker
//! runner and the pipeline workers themselves.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Supervisor`, `runner::run_worker`, every pipeline worker,
//!   `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: `Supervisor::subscriber_listener()` (fans out to
//!   `SubscriberSet` and updates `AliveTracker`), plus any receiver obtained
//!   from `Supervisor::subscribe()`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};

//! # Shutdown triggers.
//!
//! - [`ShutdownHandle`]: idempotent, cloneable trigger shared by the
//!   supervisor and any embedding code. The first trigger publishes
//!   `ShutdownRequested` and cancels the shared token; later ones are no-ops.
//! - [`wait_for_shutdown_signal`]: completes on a termination signal.
//! - [`wait_for_operator`]: completes when the operator presses Enter (or
//!   stdin reaches end of file).
//!
//! ## Signals
//! **Unix platforms:** `SIGINT`, `SIGTERM`, `SIGQUIT`.
//!
//! **Windows platforms:** `Ctrl-C` via [`tokio::signal::ctrl_c`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::events::{Bus, Event, EventKind};

/// Cloneable, idempotent shutdown trigger.
#[derive(Clone)]
pub struct ShutdownHandle {
    token: CancellationToken,
    bus: Bus,
    requested: Arc<AtomicBool>,
}

impl ShutdownHandle {
    pub(crate) fn new(token: CancellationToken, bus: Bus) -> Self {
        Self {
            token,
            bus,
            requested: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Requests shutdown. Returns `true` only for the call that actually
    /// triggered it.
    pub fn trigger(&self) -> bool {
        if self.requested.swap(true, Ordering::AcqRel) {
            return false;
        }
        tracing::info!("shutdown requested");
        self.bus.publish(Event::new(EventKind::ShutdownRequested));
        self.token.cancel();
        true
    }

    /// True once shutdown has been requested.
    pub fn is_triggered(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }

    /// Completes once shutdown has been requested.
    pub async fn triggered(&self) {
        self.token.cancelled().await;
    }

    pub(crate) fn token(&self) -> &CancellationToken {
        &self.token
    }
}

/// Waits for a termination signal.
///
/// Each call creates independent signal listeners.
///
/// Returns `Ok(())` when any signal is received, or `Err` if signal registration fails.
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {},
        _ = sigint.recv()  => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

/// Waits for a termination signal.
///
/// Returns `Ok(())` when Ctrl-C is received, or `Err` if registration fails.
#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

/// Waits for one line (or end of file) on stdin.
///
/// The read runs on a detached thread: a blocking stdin read cannot be
/// cancelled and would otherwise hold up runtime shutdown.
pub async fn wait_for_operator() -> std::io::Result<()> {
    let (tx, rx) = oneshot::channel();
    std::thread::Builder::new()
        .name("operator-stdin".into())
        .spawn(move || {
            let mut line = String::new();
            let _ = tx.send(std::io::stdin().read_line(&mut line).map(|_| ()));
        })?;
    rx.await
        .unwrap_or_else(|_| Err(std::io::Error::other("stdin reader exited")))
}

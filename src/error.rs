//! Error types used by the triviavisor runtime, its workers and publishers.
//!
//! - [`RuntimeError`]: errors raised by the orchestration runtime itself.
//! - [`WorkerError`]: errors raised by individual pipeline workers.
//! - [`PublishError`]: failures of a [`Publish`](crate::Publish) sink (non-fatal).
//! - [`CatalogError`] / [`ConfigError`]: rejected startup input.
//!
//! Every enum provides `as_label` for logs/metrics.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the triviavisor runtime.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Shutdown grace period was exceeded; the listed workers were aborted.
    #[error("shutdown timeout {grace:?} exceeded; stuck: {stuck:?}; forcing termination")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Names of the workers that did not stop in time.
        stuck: Vec<String>,
    },

    /// `Supervisor::run` was called more than once.
    #[error("supervisor already started")]
    AlreadyStarted,
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use triviavisor::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(5), stuck: vec![] };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
            RuntimeError::AlreadyStarted => "runtime_already_started",
        }
    }
}

/// # Errors produced by pipeline workers.
///
/// Cancellation is not a failure: the runner treats [`WorkerError::Canceled`]
/// exactly like a clean return.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkerError {
    /// Worker observed the shutdown token.
    #[error("context cancelled")]
    Canceled,

    /// The downstream end of a handoff channel went away.
    #[error("{channel} channel disconnected")]
    Disconnected {
        /// Logical name of the channel (e.g. `"rounds"`, `"answers"`).
        channel: &'static str,
    },

    /// A chooser returned an index outside the round's options.
    #[error("player {player} chose {choice}, but the round has {options} options")]
    InvalidChoice {
        /// Player that produced the answer.
        player: u32,
        /// Offending choice index.
        choice: usize,
        /// Number of options in the round.
        options: usize,
    },
}

impl WorkerError {
    /// Shorthand for [`WorkerError::Disconnected`].
    pub(crate) fn disconnected(channel: &'static str) -> Self {
        WorkerError::Disconnected { channel }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            WorkerError::Canceled => "worker_canceled",
            WorkerError::Disconnected { .. } => "worker_disconnected",
            WorkerError::InvalidChoice { .. } => "worker_invalid_choice",
        }
    }
}

/// # Errors returned by a [`Publish`](crate::Publish) sink.
///
/// The publisher worker logs these and moves on to the next snapshot.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum PublishError {
    /// Underlying writer failed.
    #[error("publish I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Sink refused the snapshot.
    #[error("snapshot rejected: {reason}")]
    Rejected {
        /// Why the sink refused it.
        reason: String,
    },
}

impl PublishError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            PublishError::Io(_) => "publish_io",
            PublishError::Rejected { .. } => "publish_rejected",
        }
    }
}

/// # Invalid question catalog.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The catalog has no questions.
    #[error("catalog is empty")]
    Empty,

    /// A question has fewer than two options.
    #[error("question {question:?} has {count} option(s), at least 2 required")]
    TooFewOptions {
        /// Question text.
        question: String,
        /// Number of options supplied.
        count: usize,
    },
}

impl CatalogError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            CatalogError::Empty => "catalog_empty",
            CatalogError::TooFewOptions { .. } => "catalog_too_few_options",
        }
    }
}

/// # Invalid supervisor configuration.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `Config::interval` is zero.
    #[error("round interval must be greater than zero")]
    ZeroInterval,

    /// `Config::players` does not fit a player id.
    #[error("too many players: {players} (at most {max})", max = u32::MAX)]
    TooManyPlayers {
        /// The configured player count.
        players: usize,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::ZeroInterval => "config_zero_interval",
            ConfigError::TooManyPlayers { .. } => "config_too_many_players",
        }
    }
}

//! # Game runtime configuration.
//!
//! Provides [`Config`]: centralized settings for the supervisor and the
//! pipeline it wires.
//!
//! ## Sentinel values
//! - `max_rounds = 0` → unlimited (the game runs until shutdown)
//! - `seed = None` → every random source is seeded from the OS

use std::time::Duration;

use crate::error::ConfigError;
use crate::game::{PlayerId, TallyMode};

/// Runtime configuration.
///
/// ## Field semantics
/// - `players`: number of player workers (`0` is legal: rounds are generated
///   and broadcast to nobody; at most `u32::MAX`)
/// - `interval`: time between rounds; must be non-zero
/// - `max_rounds`: stop generating after this many rounds (`0` = unlimited)
/// - `grace`: maximum wait for workers to stop after shutdown is requested
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
/// - `tally_mode`: whether counts accumulate or reset per round
/// - `seed`: fixed seed for reproducible runs
///
/// All fields are public. Prefer the helper accessors over sprinkling
/// sentinel checks across the codebase.
#[derive(Clone, Debug)]
pub struct Config {
    /// Number of simulated players.
    pub players: usize,

    /// Time between generated rounds. The first round arrives one full
    /// interval after start.
    pub interval: Duration,

    /// Round limit; `0` = unlimited.
    ///
    /// When reached, the source closes its output and the pipeline drains
    /// on its own: `Supervisor::run` returns without a shutdown request.
    pub max_rounds: u64,

    /// Maximum time to wait for graceful shutdown before aborting.
    ///
    /// When shutdown is requested:
    /// - Workers are cancelled via the shared `CancellationToken`
    /// - Supervisor waits up to `grace` for them to exit
    /// - If that expires, returns `RuntimeError::GraceExceeded`
    pub grace: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Receivers that lag behind more than `bus_capacity` events skip the
    /// oldest ones.
    pub bus_capacity: usize,

    /// Tally reset behaviour.
    pub tally_mode: TallyMode,

    /// Seed for the round source and the default player choosers.
    pub seed: Option<u64>,
}

impl Config {
    /// Returns the round limit as an `Option`.
    ///
    /// - `None` → unlimited
    /// - `Some(n)` → at most `n` rounds
    #[inline]
    pub fn round_limit(&self) -> Option<u64> {
        if self.max_rounds == 0 {
            None
        } else {
            Some(self.max_rounds)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Player identities `1..=players`.
    pub fn player_ids(&self) -> impl Iterator<Item = PlayerId> {
        PlayerId::range(self.players)
    }

    /// Rejects settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        if u32::try_from(self.players).is_err() {
            return Err(ConfigError::TooManyPlayers {
                players: self.players,
            });
        }
        Ok(())
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `players = 5`
    /// - `interval = 10s`
    /// - `max_rounds = 0` (unlimited)
    /// - `grace = 10s`
    /// - `bus_capacity = 1024`
    /// - `tally_mode = Cumulative`
    /// - `seed = None`
    fn default() -> Self {
        Self {
            players: 5,
            interval: Duration::from_secs(10),
            max_rounds: 0,
            grace: Duration::from_secs(10),
            bus_capacity: 1024,
            tally_mode: TallyMode::default(),
            seed: None,
        }
    }
}

//! # Pipeline workers.
//!
//! One tokio task per component instance, wired with unbuffered
//! [handoff](crate::channel) channels:
//!
//! ```text
//! RoundSource ──► Broadcaster ──┬──► PlayerWorker(1) ──┐
//!                               ├──► PlayerWorker(2) ──┼──► Tally ──► Publisher ──► Publish sink
//!                               └──► PlayerWorker(N) ──┘
//! ```
//!
//! Every worker selects between its next input (or timer, or output send)
//! and the shared [`CancellationToken`] at each suspension point, so none
//! of them can stay blocked once shutdown is requested.
//!
//! ## Exit contract
//! - input closed → `Ok(())` (the pipeline drains downstream on its own)
//! - token cancelled → `Err(WorkerError::Canceled)` (graceful)
//! - downstream gone → `Err(WorkerError::Disconnected { .. })`

mod broadcaster;
mod player;
mod publisher;
mod source;
mod tally;

pub use broadcaster::Broadcaster;
pub use player::{Chooser, PlayerWorker, RandomChooser};
pub use publisher::Publisher;
pub use source::RoundSource;
pub use tally::Tally;

use async_trait::async_trait;
use rand::{SeedableRng, rngs::StdRng};
use tokio_util::sync::CancellationToken;

use crate::error::WorkerError;

/// # Long-running, cancelable pipeline stage.
///
/// A worker owns its channel ends and is consumed by [`run`](Worker::run).
#[async_trait]
pub trait Worker: Send + Sized + 'static {
    /// Returns a stable, human-readable worker name.
    fn name(&self) -> &str;

    /// Runs until the input closes or `ctx` is cancelled.
    async fn run(self, ctx: CancellationToken) -> Result<(), WorkerError>;
}

/// Random source for stream `stream`: reproducible when `seed` is set,
/// OS-seeded otherwise.
pub(crate) fn seeded_rng(seed: Option<u64>, stream: u64) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed ^ stream.wrapping_mul(0x9E37_79B9_7F4A_7C15)),
        None => StdRng::from_os_rng(),
    }
}

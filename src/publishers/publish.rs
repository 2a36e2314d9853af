//! # Publish sink trait.

use async_trait::async_trait;

use crate::error::PublishError;
use crate::game::TallySnapshot;

/// External side effect for tally snapshots.
///
/// Called from the publisher worker, one snapshot at a time. Publishing
/// should be idempotent; an `Err` is logged and the next snapshot is still
/// delivered.
///
/// # Example
/// ```rust
/// use async_trait::async_trait;
/// use triviavisor::{Publish, PublishError, TallySnapshot};
///
/// struct Stderr;
///
/// #[async_trait]
/// impl Publish for Stderr {
///     async fn publish(&self, snapshot: &TallySnapshot) -> Result<(), PublishError> {
///         eprintln!("#{} {}", snapshot.seq(), snapshot);
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Publish: Send + Sync + 'static {
    /// Surfaces one snapshot.
    async fn publish(&self, snapshot: &TallySnapshot) -> Result<(), PublishError>;

    /// Sink name used in logs and `PublishFailed` events.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

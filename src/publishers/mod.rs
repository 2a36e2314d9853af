//! # Snapshot publish sinks.
//!
//! The publisher worker hands every [`TallySnapshot`](crate::TallySnapshot)
//! to one [`Publish`] sink, in emission order. This is the only externally
//! observable effect of the pipeline.
//!
//! - [`LogPublisher`] writes one line per snapshot to stdout.
//! - [`MemoryPublisher`] keeps snapshots in memory (embedding, tests).

mod log;
mod memory;
mod publish;

pub use log::LogPublisher;
pub use memory::MemoryPublisher;
pub use publish::Publish;

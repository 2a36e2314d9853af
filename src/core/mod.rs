//! Runtime core: wiring, lifecycle and shutdown.
//!
//! The public API from this module is [`Supervisor`] (built with
//! [`SupervisorBuilder`] from a [`Config`]), the [`ShutdownHandle`] it hands
//! out, and the two stop helpers used by the binary.
//!
//! Internal modules:
//! - [`runner`]: runs one worker and publishes its lifecycle events;
//! - [`supervisor`]: wires the pipeline, handles shutdown and the grace period;
//! - [`alive`]: tracks which workers are still running;
//! - [`shutdown`]: idempotent trigger, OS signals and the operator prompt.

mod alive;
mod builder;
mod config;
mod runner;
mod shutdown;
mod supervisor;

pub use builder::{ChooserFactory, SupervisorBuilder};
pub use config::Config;
pub use shutdown::{ShutdownHandle, wait_for_operator, wait_for_shutdown_signal};
pub use supervisor::Supervisor;

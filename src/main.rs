//! Interactive trivia game.
//!
//! Runs the default five-player game until the operator presses Enter (or
//! the process receives a termination signal), then stops the pipeline and
//! exits.
//!
//! Diagnostics go to stderr and honour `RUST_LOG` (default `info`); game
//! output (deliveries and tally snapshots) goes to stdout.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use triviavisor::{
    Config, LogPublisher, LogWriter, Subscribe, Supervisor, wait_for_operator,
    wait_for_shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let sup = Supervisor::builder(Config::default())
        .with_subscribers(subs)
        .with_publisher(Arc::new(LogPublisher::stdout()))
        .build()
        .context("invalid game configuration")?;

    println!("Press Enter to stop the game...");
    let signal = async {
        if let Err(e) = wait_for_shutdown_signal().await {
            tracing::warn!(error = %e, "signal handlers unavailable; waiting for Enter only");
            std::future::pending::<()>().await;
        }
    };
    sup.run_until(async {
        tokio::select! {
            res = wait_for_operator() => {
                if let Err(e) = res {
                    tracing::warn!(error = %e, "stdin unavailable; stopping");
                }
            }
            _ = signal => {}
        }
    })
    .await
    .context("game did not stop cleanly")?;

    println!("Game stopped.");
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

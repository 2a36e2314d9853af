//! # LogPublisher: snapshot printer

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt, Stdout};
use tokio::sync::Mutex;

use crate::error::PublishError;
use crate::game::TallySnapshot;
use crate::publishers::Publish;

/// Writes `Current results: {0: 2, 3: 1}` per snapshot.
pub struct LogPublisher<W = Stdout> {
    out: Mutex<W>,
}

impl LogPublisher<Stdout> {
    /// Publisher writing to the process stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl Default for LogPublisher<Stdout> {
    fn default() -> Self {
        Self::stdout()
    }
}

impl<W> LogPublisher<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    /// Publisher writing to an arbitrary async writer.
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Returns the writer back.
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

#[async_trait]
impl<W> Publish for LogPublisher<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    async fn publish(&self, snapshot: &TallySnapshot) -> Result<(), PublishError> {
        let line = format!("Current results: {snapshot}\n");
        let mut out = self.out.lock().await;
        out.write_all(line.as_bytes()).await?;
        out.flush().await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "LogPublisher"
    }
}

pub mod telnet;

use crate::net::output::OutFrame;
use async_trait::async_trait;

#[async_trait]
pub trait ClientSink: Send {
    async fn send_frame(&mut self, frame: OutFrame, seq: u64) -> anyhow::Result<()>;

    /// Flush and release the underlying writer.
    async fn close(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

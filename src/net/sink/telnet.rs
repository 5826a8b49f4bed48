use crate::net::InputMode;
use crate::net::output::OutFrame;
use crate::net::sink::ClientSink;
use crate::net::telnet::protocol::{ECHO, make_will, make_wont};
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

pub struct TelnetSink<W> {
    writer: W,
}

impl<W> TelnetSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

/// Telnet wants CRLF line endings.
fn crlf(s: &str) -> String {
    s.replace("\r\n", "\n").replace('\n', "\r\n")
}

#[async_trait]
impl<W> ClientSink for TelnetSink<W>
where
    W: AsyncWriteExt + Unpin + Send,
{
    async fn send_frame(&mut self, frame: OutFrame, _seq: u64) -> anyhow::Result<()> {
        match frame {
            OutFrame::Line(s) | OutFrame::System(s) => {
                self.writer.write_all(crlf(&s).as_bytes()).await?;
                self.writer.write_all(b"\r\n").await?;
            }
            OutFrame::Prompt(p) => {
                // no newline; the client types on the same line
                self.writer.write_all(crlf(&p).as_bytes()).await?;
            }
            OutFrame::InputMode(InputMode::Hidden) => {
                // we "will echo" and then don't, so the client stops echoing locally
                self.writer.write_all(&make_will(ECHO)).await?;
            }
            OutFrame::InputMode(InputMode::Normal) => {
                self.writer.write_all(&make_wont(ECHO)).await?;
                self.writer.write_all(b"\r\n").await?;
            }
            OutFrame::Raw(bytes) => {
                self.writer.write_all(&bytes).await?;
            }
        }
        self.writer.flush().await?;

        Ok(())
    }

    async fn close(&mut self) -> anyhow::Result<()> {
        self.writer.shutdown().await?;
        Ok(())
    }
}

use crate::net::InputMode;
use crate::net::sink::ClientSink;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutFrame {
    /// Regular "in-game" text line
    Line(String),
    /// System message from the engine, not world related
    System(String),
    /// Prompt, no trailing newline
    Prompt(String),
    /// Switch client echo on or off
    InputMode(InputMode),
    /// Raw bytes for telnet IAC sequences
    Raw(Vec<u8>),
}

impl OutFrame {
    /// Text carried by the frame, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            OutFrame::Line(s) | OutFrame::System(s) | OutFrame::Prompt(s) => Some(s),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum OutEvent {
    /// A complete output frame with sequence number
    Frame(OutFrame, u64),
    /// The session is done with this connection
    Close,
}

/// Cheap cloneable writer for one connection. Sends never fail from the caller's point of
/// view: output to a connection that went away is dropped.
///
/// The async writers wait for room in the channel and are for the session's own output.
/// Anything sent on behalf of someone else goes through [`OutputHandle::notify`], which never
/// waits: a peer that stopped reading loses the line instead of stalling the sender.
#[derive(Debug, Clone)]
pub struct OutputHandle {
    tx: mpsc::Sender<OutEvent>,
    next_seq: Arc<AtomicU64>,
}

impl OutputHandle {
    pub fn new(tx: mpsc::Sender<OutEvent>) -> Self {
        Self {
            tx,
            next_seq: Arc::new(AtomicU64::new(1)),
        }
    }

    #[inline]
    fn next_seq(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::Relaxed)
    }

    async fn frame(&self, frame: OutFrame) {
        let _ = self.tx.send(OutEvent::Frame(frame, self.next_seq())).await;
    }

    pub async fn line(&self, s: impl Into<String>) {
        self.frame(OutFrame::Line(s.into())).await;
    }

    pub async fn system(&self, s: impl Into<String>) {
        self.frame(OutFrame::System(s.into())).await;
    }

    pub async fn prompt(&self, s: impl Into<String>) {
        self.frame(OutFrame::Prompt(s.into())).await;
    }

    pub async fn input_mode(&self, mode: InputMode) {
        self.frame(OutFrame::InputMode(mode)).await;
    }

    pub async fn raw(&self, bytes: Vec<u8>) {
        self.frame(OutFrame::Raw(bytes)).await;
    }

    /// Queue a line without waiting. Returns false when the line was dropped because the
    /// connection is gone or its queue is full.
    pub fn notify(&self, s: impl Into<String>) -> bool {
        match self.tx.try_send(OutEvent::Frame(OutFrame::Line(s.into()), self.next_seq())) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::debug!("output queue full, line dropped");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }

    pub async fn close(&self) {
        let _ = self.tx.send(OutEvent::Close).await;
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Drains a connection's output channel into a client sink.
pub struct SessionOut {
    rx: mpsc::Receiver<OutEvent>,
}

impl SessionOut {
    pub fn new(rx: mpsc::Receiver<OutEvent>) -> Self {
        Self { rx }
    }

    pub async fn run<C>(mut self, mut client: C) -> anyhow::Result<()>
    where
        C: ClientSink,
    {
        while let Some(event) = self.rx.recv().await {
            match event {
                OutEvent::Frame(frame, seq_nr) => client.send_frame(frame, seq_nr).await?,
                OutEvent::Close => break,
            }
        }

        client.close().await
    }
}

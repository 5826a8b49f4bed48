use crate::net::output::{OutEvent, OutputHandle};
use tokio::sync::mpsc;

pub mod output;
pub mod sink;
pub mod telnet;

/// Frames buffered per connection in either direction.
const CHANNEL_DEPTH: usize = 64;

/// What a transport delivers to a session. A closed channel means the peer is gone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// One line of text, without the line terminator
    Line(String),
    /// Advisory terminal size change
    Resize { cols: u16, rows: u16 },
}

#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Client must not echo what is typed (secret entry)
    Hidden,
}

/// The session side of a connection.
pub struct ConnectionIo {
    pub output: OutputHandle,
    pub input: mpsc::Receiver<InputEvent>,
}

/// The transport side of a connection.
pub struct ClientEnd {
    pub input: mpsc::Sender<InputEvent>,
    pub output: mpsc::Receiver<OutEvent>,
}

/// A connected pair of bounded channels: whatever the client end sends arrives as session
/// input, and whatever the session writes arrives at the client end.
pub fn channel_pair() -> (ConnectionIo, ClientEnd) {
    let (in_tx, in_rx) = mpsc::channel(CHANNEL_DEPTH);
    let (out_tx, out_rx) = mpsc::channel(CHANNEL_DEPTH);

    (
        ConnectionIo {
            output: OutputHandle::new(out_tx),
            input: in_rx,
        },
        ClientEnd {
            input: in_tx,
            output: out_rx,
        },
    )
}

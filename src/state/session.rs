use crate::Registry;
use crate::error::SessionError;
use crate::models::account::Account;
use crate::models::character::Character;
use crate::net::output::OutputHandle;
use crate::net::{ConnectionIo, InputEvent, InputMode};
use std::sync::Arc;
use tokio::sync::mpsc;

/// One connection's state. Owned by the connection's task, never shared.
pub struct Session {
    pub registry: Arc<Registry>,
    pub output: OutputHandle,
    input: mpsc::Receiver<InputEvent>,
    pub peer: String,
    pub session_started: std::time::Instant,

    /// Set once the player has logged in or registered
    pub account: Option<Account>,
    /// Set while the player is in the game
    pub character: Option<Arc<Character>>,

    tty: Option<(u16, u16)>,
    disconnected: bool,
}

impl Session {
    pub fn new(registry: Arc<Registry>, io: ConnectionIo, peer: String) -> Self {
        Self {
            registry,
            output: io.output,
            input: io.input,
            peer,
            session_started: std::time::Instant::now(),
            account: None,
            character: None,
            tty: None,
            disconnected: false,
        }
    }

    /// Next line of input. Window-size changes are absorbed on the way.
    pub async fn read_line(&mut self) -> Result<String, SessionError> {
        loop {
            match self.input.recv().await {
                Some(InputEvent::Line(line)) => return Ok(line),
                Some(InputEvent::Resize { cols, rows }) => {
                    tracing::trace!(peer = %self.peer, cols, rows, "window size");
                    self.tty = Some((cols, rows));
                }
                None => {
                    self.disconnected = true;
                    return Err(SessionError::Disconnected);
                }
            }
        }
    }

    /// Show `text` and read the trimmed answer.
    pub async fn prompt(&mut self, text: &str) -> Result<String, SessionError> {
        self.output.prompt(text).await;
        Ok(self.read_line().await?.trim().to_string())
    }

    /// Like [`prompt`](Self::prompt) but with client echo off. The answer is not trimmed.
    pub async fn prompt_secret(&mut self, text: &str) -> Result<String, SessionError> {
        self.output.input_mode(InputMode::Hidden).await;
        self.output.prompt(text).await;
        let line = self.read_line().await;
        self.output.input_mode(InputMode::Normal).await;
        line
    }

    pub fn tty(&self) -> Option<(u16, u16)> {
        self.tty
    }

    pub fn is_disconnected(&self) -> bool {
        self.disconnected
    }

    pub fn account_name(&self) -> &str {
        self.account.as_ref().map(|a| a.name.as_str()).unwrap_or("-")
    }
}

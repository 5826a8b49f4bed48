//! Minimal telnet option handling plus line assembly.

use bytes::BytesMut;
use std::collections::HashSet;
use tokio::io::{AsyncWrite, AsyncWriteExt};

pub const IAC: u8 = 255; // Interpret As Command
pub const WILL: u8 = 251;
pub const WONT: u8 = 252;
pub const DO: u8 = 253;
pub const DONT: u8 = 254;
pub const SB: u8 = 250; // Subnegotiation begin
pub const SE: u8 = 240; // Subnegotiation end

pub const ECHO: u8 = 1;
pub const SGA: u8 = 3; // Suppress Go-Ahead
pub const NAWS: u8 = 31; // Negotiate About Window Size
pub const LINEMODE: u8 = 34;

const MAX_LINE: usize = 1024;

#[derive(Debug, PartialEq, Eq)]
pub enum TelnetIn {
    /// Regular data byte
    Data(u8),
    /// Client resized terminal; cols and rows in characters
    Naws { cols: u16, rows: u16 },
}

#[derive(Debug, Default)]
pub struct TelnetResponse {
    /// Event to be processed (if any)
    pub event: Option<TelnetIn>,
    /// IAC response bytes to send back to client (if any)
    pub response: Option<Vec<u8>>,
}

impl TelnetResponse {
    fn none() -> Self {
        Self::default()
    }

    fn event(ev: TelnetIn) -> Self {
        Self {
            event: Some(ev),
            response: None,
        }
    }
}

/// Byte-at-a-time telnet decoder.
#[derive(Default)]
pub struct TelnetMachine {
    /// Are we in an IAC sequence?
    in_iac: bool,
    /// If in_iac, which command are we processing (WILL/WONT/DO/DONT/SB)
    in_cmd: Option<u8>,
    /// Inside a subnegotiation (after SB, before IAC SE)
    in_sb: bool,
    sb_opt: u8,
    sb_buf: Vec<u8>,
    /// Options we already answered, so a chatty client cannot start a negotiation loop
    answered: HashSet<(u8, u8)>,
}

impl TelnetMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Line mode with local echo stays the client's default; we only ask for window size.
    pub async fn start_negotiation<W: AsyncWrite + Unpin>(&mut self, w: &mut W) -> std::io::Result<()> {
        w.write_all(&make_do(NAWS)).await?;
        w.flush().await
    }

    /// Feed one byte.
    pub fn push(&mut self, b: u8) -> TelnetResponse {
        if !self.in_iac {
            if b == IAC {
                self.in_iac = true;
                return TelnetResponse::none();
            }
            if self.in_sb {
                self.sb_buf.push(b);
                return TelnetResponse::none();
            }
            return TelnetResponse::event(TelnetIn::Data(b));
        }

        self.in_iac = false;

        match b {
            IAC if self.in_cmd.is_none() => {
                // escaped 0xFF
                if self.in_sb {
                    self.sb_buf.push(IAC);
                    TelnetResponse::none()
                } else {
                    TelnetResponse::event(TelnetIn::Data(IAC))
                }
            }
            DO | DONT | WILL | WONT | SB if self.in_cmd.is_none() => {
                if b == SB {
                    self.in_sb = true;
                    self.sb_buf.clear();
                }
                self.in_cmd = Some(b);
                self.in_iac = true; // option byte comes next
                TelnetResponse::none()
            }
            SE if self.in_cmd.is_none() => self.end_subnegotiation(),
            opt => match self.in_cmd.take() {
                Some(SB) => {
                    self.sb_opt = opt;
                    TelnetResponse::none()
                }
                Some(cmd) => TelnetResponse {
                    event: None,
                    response: self.answer(cmd, opt),
                },
                // other commands (NOP, GA, ...) carry no option
                None => TelnetResponse::none(),
            },
        }
    }

    fn end_subnegotiation(&mut self) -> TelnetResponse {
        if !self.in_sb {
            return TelnetResponse::none();
        }
        self.in_sb = false;
        let data = std::mem::take(&mut self.sb_buf);

        // NAWS: cols_hi, cols_lo, rows_hi, rows_lo
        if self.sb_opt == NAWS && data.len() >= 4 {
            let cols = u16::from_be_bytes([data[0], data[1]]);
            let rows = u16::from_be_bytes([data[2], data[3]]);
            return TelnetResponse::event(TelnetIn::Naws { cols, rows });
        }
        TelnetResponse::none()
    }

    fn answer(&mut self, cmd: u8, opt: u8) -> Option<Vec<u8>> {
        if !self.answered.insert((cmd, opt)) {
            return None;
        }
        match (cmd, opt) {
            // we toggle ECHO ourselves for secret entry; the client just confirms
            (DO, ECHO) | (DONT, ECHO) => None,
            (DO, SGA) => Some(make_will(SGA)),
            (DO, _) => Some(make_wont(opt)),
            (WILL, NAWS) => None,
            (WILL, LINEMODE) => Some(make_dont(LINEMODE)),
            (WILL, _) => Some(make_dont(opt)),
            _ => None,
        }
    }
}

pub fn make_do(opt: u8) -> Vec<u8> {
    vec![IAC, DO, opt]
}

pub fn make_dont(opt: u8) -> Vec<u8> {
    vec![IAC, DONT, opt]
}

pub fn make_will(opt: u8) -> Vec<u8> {
    vec![IAC, WILL, opt]
}

pub fn make_wont(opt: u8) -> Vec<u8> {
    vec![IAC, WONT, opt]
}

/// Collects data bytes into lines. Accepts `\n`, `\r\n`, `\r\0` and a bare `\r`.
#[derive(Default)]
pub struct LineBuffer {
    buf: BytesMut,
    after_cr: bool,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(256),
            after_cr: false,
        }
    }

    pub fn push(&mut self, b: u8) -> Option<String> {
        let after_cr = std::mem::replace(&mut self.after_cr, false);
        match b {
            b'\n' if after_cr => None,
            0 => None,
            b'\r' | b'\n' => {
                self.after_cr = b == b'\r';
                let line = self.buf.split();
                Some(String::from_utf8_lossy(&line).into_owned())
            }
            0x08 | 0x7F => {
                let len = self.buf.len();
                if len > 0 {
                    self.buf.truncate(len - 1);
                }
                None
            }
            _ => {
                if self.buf.len() < MAX_LINE {
                    self.buf.extend_from_slice(&[b]);
                }
                None
            }
        }
    }
}

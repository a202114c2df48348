//! Blocking telnet terminal.
//!
//! Strips option negotiation from the input, folds the various end-of-line
//! conventions into a single Enter, and maps DEL to Backspace. Any read or
//! write failure, EOF or idle timeout is a [`Hangup`].

use log::debug;
use std::io::{ErrorKind, Read, Write};

use crate::menus::terminal::{Hangup, Terminal, BACKSPACE, ENTER};

const IAC: u8 = 255;
const DONT: u8 = 254;
const DO: u8 = 253;
const WONT: u8 = 252;
const WILL: u8 = 251;
const SB: u8 = 250;
const SE: u8 = 240;
const OPT_ECHO: u8 = 1;
const OPT_SGA: u8 = 3;
const OPT_LINEMODE: u8 = 34;
const DEL: u8 = 127;

pub struct TelnetTerminal<R, W> {
    reader: R,
    writer: W,
    /// The previous key was a CR; a following LF or NUL belongs to it.
    after_cr: bool,
    bytes_in: u64,
}

impl<R: Read, W: Write> TelnetTerminal<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        TelnetTerminal {
            reader,
            writer,
            after_cr: false,
            bytes_in: 0,
        }
    }

    /// Ask the client for character-at-a-time input with server-side echo.
    pub fn negotiate(&mut self) -> Result<(), Hangup> {
        self.write_bytes(&[
            IAC, WILL, OPT_ECHO, IAC, WILL, OPT_SGA, IAC, DO, OPT_SGA, IAC, DONT, OPT_LINEMODE,
        ])
    }

    pub fn bytes_in(&self) -> u64 {
        self.bytes_in
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Hangup> {
        self.writer
            .write_all(bytes)
            .and_then(|_| self.writer.flush())
            .map_err(|e| {
                debug!("telnet write failed: {}", e);
                Hangup
            })
    }

    fn read_byte(&mut self) -> Result<u8, Hangup> {
        let mut buf = [0u8; 1];
        loop {
            match self.reader.read(&mut buf) {
                Ok(0) => return Err(Hangup),
                Ok(_) => {
                    self.bytes_in += 1;
                    return Ok(buf[0]);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    debug!("telnet idle timeout");
                    return Err(Hangup);
                }
                Err(e) => {
                    debug!("telnet read failed: {}", e);
                    return Err(Hangup);
                }
            }
        }
    }

    /// Next byte of user data, with telnet commands removed.
    fn read_data_byte(&mut self) -> Result<u8, Hangup> {
        loop {
            let b = self.read_byte()?;
            if b != IAC {
                return Ok(b);
            }
            match self.read_byte()? {
                IAC => return Ok(IAC),
                WILL | WONT | DO | DONT => {
                    self.read_byte()?;
                }
                SB => self.skip_subnegotiation()?,
                _ => {}
            }
        }
    }

    fn skip_subnegotiation(&mut self) -> Result<(), Hangup> {
        loop {
            if self.read_byte()? == IAC && self.read_byte()? == SE {
                return Ok(());
            }
        }
    }

    /// Decode the rest of a UTF-8 sequence; malformed input yields U+FFFD.
    fn decode_utf8(&mut self, lead: u8) -> Result<char, Hangup> {
        let extra = match lead {
            0xC0..=0xDF => 1,
            0xE0..=0xEF => 2,
            0xF0..=0xF7 => 3,
            _ => return Ok(char::REPLACEMENT_CHARACTER),
        };
        let mut buf = vec![lead];
        for _ in 0..extra {
            buf.push(self.read_data_byte()?);
        }
        Ok(std::str::from_utf8(&buf)
            .ok()
            .and_then(|s| s.chars().next())
            .unwrap_or(char::REPLACEMENT_CHARACTER))
    }
}

impl<R: Read, W: Write> Terminal for TelnetTerminal<R, W> {
    fn getkey(&mut self) -> Result<char, Hangup> {
        loop {
            let b = self.read_data_byte()?;
            let after_cr = std::mem::take(&mut self.after_cr);
            match b {
                b'\n' | 0 if after_cr => continue,
                b'\r' => {
                    self.after_cr = true;
                    return Ok(ENTER);
                }
                b'\n' => return Ok(ENTER),
                DEL => return Ok(BACKSPACE),
                0 => continue,
                b if b.is_ascii() => return Ok(b as char),
                lead => return self.decode_utf8(lead),
            }
        }
    }

    fn write_str(&mut self, text: &str) -> Result<(), Hangup> {
        // UTF-8 never contains 0xFF, so no IAC escaping is needed.
        self.write_bytes(text.as_bytes())
    }
}

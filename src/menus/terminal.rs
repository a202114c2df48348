//! Character I/O seam between the menu engine and whatever carries the bytes.
//!
//! The engine only ever needs "give me the next key" and "show this text". Every
//! call may discover that the caller is gone; that surfaces as [`Hangup`], which
//! each loop propagates with `?` so nested loops unwind immediately.

pub const ENTER: char = '\r';
pub const BACKSPACE: char = '\u{8}';
pub const SPACE: char = ' ';

/// Longest free-form command line accepted at a menu prompt.
pub const MAX_COMMAND_LINE: usize = 50;

/// The session's connection is gone. Not a failure of any menu operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("caller disconnected")]
pub struct Hangup;

/// How [`read_line`] treats typed characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineMode {
    /// Echo as typed.
    Plain,
    /// Upper-case and echo.
    Upper,
    /// Echo `*` for every character.
    Masked,
}

pub trait Terminal {
    /// Block until the caller sends one character.
    fn getkey(&mut self) -> Result<char, Hangup>;

    fn write_str(&mut self, text: &str) -> Result<(), Hangup>;

    fn putch(&mut self, ch: char) -> Result<(), Hangup> {
        let mut buf = [0u8; 4];
        self.write_str(ch.encode_utf8(&mut buf))
    }

    fn nl(&mut self) -> Result<(), Hangup> {
        self.write_str("\r\n")
    }

    /// Erase the character left of the cursor.
    fn backspace(&mut self) -> Result<(), Hangup> {
        self.write_str("\u{8} \u{8}")
    }

    fn cls(&mut self) -> Result<(), Hangup> {
        self.write_str("\x1b[2J\x1b[H")
    }

    fn pause(&mut self) -> Result<(), Hangup> {
        self.write_str("[PAUSE]")?;
        self.getkey()?;
        self.write_str("\r       \r")
    }

    /// Write multi-line text, normalising bare `\n` to `\r\n`.
    fn print_text(&mut self, text: &str) -> Result<(), Hangup> {
        for line in text.split_inclusive('\n') {
            match line.strip_suffix('\n') {
                Some(body) => {
                    self.write_str(body.strip_suffix('\r').unwrap_or(body))?;
                    self.nl()?;
                }
                None => self.write_str(line)?,
            }
        }
        Ok(())
    }

    /// Read a bounded, upper-cased line terminated by Enter.
    fn input_upper(&mut self, max_len: usize) -> Result<String, Hangup> {
        read_line(self, max_len, LineMode::Upper)
    }

    fn input_line(&mut self, max_len: usize) -> Result<String, Hangup> {
        read_line(self, max_len, LineMode::Plain)
    }

    fn input_password(&mut self, prompt: &str, max_len: usize) -> Result<String, Hangup> {
        self.write_str(prompt)?;
        read_line(self, max_len, LineMode::Masked)
    }
}

/// Minimal line editor: printable characters up to `max_len`, Backspace edits, Enter ends.
pub fn read_line<T>(term: &mut T, max_len: usize, mode: LineMode) -> Result<String, Hangup>
where
    T: Terminal + ?Sized,
{
    let mut line = String::new();
    loop {
        let ch = term.getkey()?;
        match ch {
            ENTER => {
                term.nl()?;
                return Ok(line);
            }
            BACKSPACE => {
                if line.pop().is_some() {
                    term.backspace()?;
                }
            }
            c if c.is_control() => {}
            c if line.chars().count() < max_len => {
                let c = if mode == LineMode::Upper {
                    c.to_ascii_uppercase()
                } else {
                    c
                };
                line.push(c);
                term.putch(if mode == LineMode::Masked { '*' } else { c })?;
            }
            _ => {}
        }
    }
}

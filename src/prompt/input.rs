//! Key-at-a-time input sources for the prompt session.
use anyhow::{anyhow, bail, Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::io::{self, BufRead, Read};

/// A single keypress as the session sees it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Backspace,
    Up,
    Down,
    /// Ctrl-C, Ctrl-D, or end of input.
    Interrupt,
    Other,
}

/// Anything that can block until the operator presses a key.
pub trait KeySource {
    fn read_key(&mut self) -> Result<Key>;
}

/// Pick the reader for the process's stdin.
pub fn stdin_keys() -> Box<dyn KeySource> {
    use std::io::IsTerminal;
    if io::stdin().is_terminal() {
        Box::new(TerminalKeys)
    } else {
        tracing::debug!("stdin is not a terminal; reading keys from piped input");
        Box::new(PipedKeys::new(io::stdin().lock()))
    }
}

/// Reads keys from the controlling terminal in raw mode.
///
/// Raw mode is held only for the duration of one read.
pub struct TerminalKeys;

struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> Result<Self> {
        enable_raw_mode().context("enable terminal raw mode")?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

impl KeySource for TerminalKeys {
    fn read_key(&mut self) -> Result<Key> {
        let _raw = RawModeGuard::enable()?;
        loop {
            if let Event::Key(key) = event::read().context("read terminal event")? {
                if key.kind == KeyEventKind::Press {
                    return Ok(map_key_event(key));
                }
            }
        }
    }
}

fn map_key_event(key: KeyEvent) -> Key {
    let control = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') | KeyCode::Char('d') if control => Key::Interrupt,
        KeyCode::Char(ch) => Key::Char(ch),
        KeyCode::Enter => Key::Enter,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        _ => Key::Other,
    }
}

/// Treats each character of a non-terminal stream as a keypress.
///
/// Input is decoded as UTF-8; a malformed sequence is an error. `\r\n` is a
/// single Enter.
pub struct PipedKeys<R> {
    bytes: io::Bytes<R>,
    after_cr: bool,
}

impl<R: BufRead> PipedKeys<R> {
    pub fn new(reader: R) -> Self {
        Self {
            bytes: reader.bytes(),
            after_cr: false,
        }
    }
}

impl<R: Read> PipedKeys<R> {
    fn next_byte(&mut self) -> Result<Option<u8>> {
        self.bytes
            .next()
            .transpose()
            .context("read piped input")
    }

    fn decode_char(&mut self, lead: u8) -> Result<char> {
        let width = match lead {
            0xc2..=0xdf => 2,
            0xe0..=0xef => 3,
            0xf0..=0xf4 => 4,
            _ => bail!("invalid UTF-8 byte 0x{lead:02x} in piped input"),
        };
        let mut buf = [lead, 0, 0, 0];
        for slot in buf.iter_mut().take(width).skip(1) {
            *slot = self
                .next_byte()?
                .ok_or_else(|| anyhow!("truncated UTF-8 sequence at end of piped input"))?;
        }
        let text = std::str::from_utf8(&buf[..width])
            .with_context(|| format!("invalid UTF-8 sequence {:02x?} in piped input", &buf[..width]))?;
        text.chars()
            .next()
            .ok_or_else(|| anyhow!("empty UTF-8 sequence in piped input"))
    }
}

impl<R: Read> KeySource for PipedKeys<R> {
    fn read_key(&mut self) -> Result<Key> {
        loop {
            let Some(byte) = self.next_byte()? else {
                return Ok(Key::Interrupt);
            };
            let after_cr = std::mem::replace(&mut self.after_cr, byte == b'\r');
            if byte == b'\n' && after_cr {
                continue;
            }
            if byte.is_ascii() {
                return Ok(map_byte(byte));
            }
            return self.decode_char(byte).map(Key::Char);
        }
    }
}

fn map_byte(byte: u8) -> Key {
    match byte {
        b'\n' | b'\r' => Key::Enter,
        0x03 | 0x04 => Key::Interrupt,
        0x08 | 0x7f => Key::Backspace,
        b' '..=b'~' => Key::Char(char::from(byte)),
        _ => Key::Other,
    }
}

#[cfg(test)]
pub use scripted::ScriptedKeys;

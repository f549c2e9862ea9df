//! Host terminal access.
//!
//! The editor only needs three capabilities from the outside world:
//! - read one raw byte (`Input`)
//! - write bytes and report the width in columns (`Output`)
//! - styled colours for the prompt and listings (style.rs)
//!
//! Stdio implementations put the terminal in raw mode only while a byte
//! is being read, so callbacks and printed text see a cooked terminal.

mod style;

use std::collections::VecDeque;
use std::env;
use std::io::{self, Read, Write};

use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::tty::IsTty;
use tracing::{debug, warn};

use crate::error::TermError;

pub use style::{default_prompt_style, parse_color, styled, Palette};

pub const DEFAULT_COLUMNS: usize = 80;

const UNSUPPORTED_TERMS: &[&str] = &["dumb", "cons25", "emacs"];

/// Source of raw key bytes.
pub trait Input {
    /// Block for the next byte. `None` means the input is exhausted.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;
}

/// Sink for editor output.
pub trait Output: Write + Send {
    /// Width of the terminal in character cells.
    fn columns(&self) -> usize;
}

impl<I: Input + ?Sized> Input for Box<I> {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        (**self).read_byte()
    }
}

#[derive(Debug, Default)]
pub struct StdinInput;

impl Input for StdinInput {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let _raw = RawModeGuard::enable()?;
        let mut byte = [0u8; 1];
        let mut stdin = io::stdin().lock();
        loop {
            match stdin.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
    }
}

struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(err) = disable_raw_mode() {
            warn!(target: "terminal", error = %err, "failed to leave raw mode");
        }
    }
}

pub struct StdoutOutput {
    out: io::Stdout,
}

impl StdoutOutput {
    pub fn new() -> Self {
        Self { out: io::stdout() }
    }
}

impl Default for StdoutOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for StdoutOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.out.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

impl Output for StdoutOutput {
    fn columns(&self) -> usize {
        match crossterm::terminal::size() {
            Ok((cols, _)) if cols >= 2 => usize::from(cols),
            _ => DEFAULT_COLUMNS,
        }
    }
}

/// Plays canned bytes as if typed, then defers to `inner`.
pub struct Replay<I> {
    pending: VecDeque<u8>,
    inner: Option<I>,
}

impl<I: Input> Replay<I> {
    pub fn new(content: &str, inner: Option<I>) -> Self {
        Self {
            pending: content.bytes().collect(),
            inner,
        }
    }

    /// Queue more bytes behind whatever is still pending.
    pub fn push(&mut self, content: &str) {
        self.pending.extend(content.bytes());
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl<I: Input> Input for Replay<I> {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        if let Some(byte) = self.pending.pop_front() {
            return Ok(Some(byte));
        }
        match self.inner.as_mut() {
            Some(inner) => inner.read_byte(),
            None => Ok(None),
        }
    }
}

/// Refuse interactive editing on a non-tty stdin or a dumb terminal.
pub fn check_support() -> Result<(), TermError> {
    if !io::stdin().is_tty() {
        return Err(TermError::UnsupportedTerminal(
            "stdin is not a terminal".to_string(),
        ));
    }
    check_term_name(env::var("TERM").ok().as_deref())
}

fn check_term_name(term: Option<&str>) -> Result<(), TermError> {
    let Some(term) = term else {
        return Ok(());
    };
    if UNSUPPORTED_TERMS
        .iter()
        .any(|name| name.eq_ignore_ascii_case(term))
    {
        return Err(TermError::UnsupportedTerminal(format!("TERM={term}")));
    }
    Ok(())
}

/// Stop the process until it is resumed. Returns false where job control
/// is unavailable.
pub fn suspend() -> bool {
    #[cfg(unix)]
    {
        debug!(target: "terminal", "suspending");
        // SAFETY: raise only delivers a signal to the calling process.
        let rc = unsafe { libc::raise(libc::SIGSTOP) };
        rc == 0
    }
    #[cfg(not(unix))]
    {
        debug!(target: "terminal", "suspend unsupported");
        false
    }
}

use std::io::IsTerminal;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use statum::{machine, state};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::raw_mode::{with_raw_mode, CrosstermMode};
use super::{RawModeGuard, TerminalError};
use crate::control::InputSource;

/// Upper bound for a single poll
pub const MAX_READ_TIMEOUT: Duration = Duration::from_millis(100);

const BYTE_NUL: u8 = 0x00;
const BYTE_ETX: u8 = 0x03;
const BYTE_TAB: u8 = 0x09;
const BYTE_CR: u8 = 0x0d;
const BYTE_ESC: u8 = 0x1b;
const BYTE_DEL: u8 = 0x7f;

// Reader settings
#[derive(Clone, Debug, Default)]
pub struct ReaderSettings {
    /// How long a poll may wait for a key. Zero checks without waiting.
    pub read_timeout: Duration,
}

#[state]
#[derive(Debug, Clone)]
pub enum ReaderState {
    Unconfigured,
    Configured,
}

#[machine]
#[derive(Debug)]
pub struct TerminalReader<S: ReaderState> {
    settings: ReaderSettings,

    // Cancelled when the operator presses Ctrl-C while raw mode is held
    interrupt: CancellationToken,
}

impl<S: ReaderState> TerminalReader<S> {
    pub fn settings(&self) -> &ReaderSettings {
        &self.settings
    }
}

impl TerminalReader<Unconfigured> {
    pub fn create(settings: Option<ReaderSettings>, interrupt: CancellationToken) -> Self {
        let settings = settings.unwrap_or_default();
        debug!("Creating terminal reader with settings: {:?}", settings);
        Self::new(settings, interrupt)
    }

    /// Checks that stdin is a terminal whose mode can be switched and restored,
    /// then installs the read timeout.
    pub fn configure(mut self) -> Result<TerminalReader<Configured>, TerminalError> {
        if !std::io::stdin().is_terminal() {
            error!("Standard input is not attached to a terminal");
            return Err(TerminalError::NotATerminal);
        }

        RawModeGuard::acquire(&CrosstermMode)?.release()?;

        if self.settings.read_timeout > MAX_READ_TIMEOUT {
            warn!(
                "Read timeout of {:?} exceeds {:?}, clamping",
                self.settings.read_timeout, MAX_READ_TIMEOUT
            );
            self.settings.read_timeout = MAX_READ_TIMEOUT;
        }

        info!(
            "Terminal configured, read timeout {:?}",
            self.settings.read_timeout
        );
        Ok(self.transition())
    }
}

impl TerminalReader<Configured> {
    /// Consumes one pending key, if any, with raw mode held only for the
    /// duration of this call.
    pub fn poll_and_consume(&mut self) -> Result<Option<u8>, TerminalError> {
        let timeout = self.settings.read_timeout;
        let byte = with_raw_mode(&CrosstermMode, || read_pending_byte(timeout))?;

        if byte == Some(BYTE_ETX) {
            info!("Ctrl-C pressed, requesting shutdown");
            self.interrupt.cancel();
        }
        Ok(byte)
    }
}

impl InputSource for TerminalReader<Configured> {
    fn poll_and_consume(&mut self) -> Result<Option<u8>, TerminalError> {
        TerminalReader::<Configured>::poll_and_consume(self)
    }
}

fn read_pending_byte(timeout: Duration) -> Result<Option<u8>, TerminalError> {
    if !event::poll(timeout).map_err(TerminalError::Read)? {
        return Ok(None);
    }

    match event::read().map_err(TerminalError::Read)? {
        Event::Key(key) if key.kind != KeyEventKind::Release => Ok(key_to_byte(&key)),
        _ => Ok(None),
    }
}

/// Byte the key would have produced on a cooked terminal, if it is a single byte
///
/// Control chords yield their control byte (Ctrl-W is 0x17, Ctrl-Space is
/// 0x00), never the plain letter.
pub fn key_to_byte(key: &KeyEvent) -> Option<u8> {
    let control = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char(' ') | KeyCode::Char('@') if control => Some(BYTE_NUL),
        KeyCode::Char(c) if control && c.is_ascii_alphabetic() => {
            Some(c.to_ascii_lowercase() as u8 & 0x1f)
        }
        KeyCode::Char(_) if control => None,
        KeyCode::Char(c) if c.is_ascii() => Some(c as u8),
        KeyCode::Enter => Some(BYTE_CR),
        KeyCode::Tab => Some(BYTE_TAB),
        KeyCode::Esc => Some(BYTE_ESC),
        KeyCode::Backspace => Some(BYTE_DEL),
        _ => None,
    }
}

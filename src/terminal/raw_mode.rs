//! Scoped raw mode acquisition
//!
//! [`RawModeGuard`] switches the terminal into raw mode (no line buffering, no
//! echo) and restores the mode that was active before. Dropping the guard
//! restores the mode as well, so an early return can never leave the terminal
//! in raw mode.

use std::io;

use crossterm::terminal;
use tracing::error;

use super::TerminalError;

/// Switch between raw and the previously active terminal mode
pub trait TerminalMode {
    fn enable_raw(&self) -> io::Result<()>;
    fn disable_raw(&self) -> io::Result<()>;
}

/// Mode control for the process's controlling terminal
#[derive(Debug, Clone, Copy, Default)]
pub struct CrosstermMode;

impl TerminalMode for CrosstermMode {
    fn enable_raw(&self) -> io::Result<()> {
        terminal::enable_raw_mode()
    }

    fn disable_raw(&self) -> io::Result<()> {
        terminal::disable_raw_mode()
    }
}

#[derive(Debug)]
pub struct RawModeGuard<'a, M: TerminalMode> {
    mode: &'a M,
    released: bool,
}

impl<'a, M: TerminalMode> RawModeGuard<'a, M> {
    pub fn acquire(mode: &'a M) -> Result<Self, TerminalError> {
        mode.enable_raw().map_err(TerminalError::SetMode)?;
        Ok(Self {
            mode,
            released: false,
        })
    }

    /// Restores the previous mode, reporting failure to the caller
    pub fn release(mut self) -> Result<(), TerminalError> {
        self.released = true;
        self.mode.disable_raw().map_err(TerminalError::RestoreMode)
    }
}

impl<M: TerminalMode> Drop for RawModeGuard<'_, M> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.mode.disable_raw() {
            error!("Failed to restore terminal mode: {}", e);
        }
    }
}

/// Runs `read` with raw mode held, restoring the mode before returning on
/// every path. A read error is reported only after the mode is restored.
pub fn with_raw_mode<M, F>(mode: &M, read: F) -> Result<Option<u8>, TerminalError>
where
    M: TerminalMode,
    F: FnOnce() -> Result<Option<u8>, TerminalError>,
{
    let guard = RawModeGuard::acquire(mode)?;
    let byte = read();
    guard.release()?;
    byte
}

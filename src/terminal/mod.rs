//! Terminal input for the teleoperation loop
//!
//! ```text
//! stdin ──► RawModeGuard (per poll) ──► KeyEvent ──► byte
//! ```
//!
//! [`reader::TerminalReader`] is a two state machine: it is created
//! `Unconfigured` and only offers polling once `configure()` has verified the
//! terminal. Every poll toggles raw mode inside its own scope so the terminal
//! is back in its previous mode between polls.

pub mod raw_mode;
pub mod reader;

use std::io;

pub use raw_mode::{with_raw_mode, CrosstermMode, RawModeGuard, TerminalMode};
pub use reader::{
    key_to_byte, Configured, ReaderSettings, TerminalReader, Unconfigured, MAX_READ_TIMEOUT,
};

/// Terminal errors are fatal; the loop stops on the first one
#[derive(Debug, thiserror::Error)]
pub enum TerminalError {
    #[error("Standard input is not a terminal")]
    NotATerminal,

    #[error("Failed to set terminal mode: {0}")]
    SetMode(#[source] io::Error),

    #[error("Failed to restore terminal mode: {0}")]
    RestoreMode(#[source] io::Error),

    #[error("Failed to read terminal input: {0}")]
    Read(#[source] io::Error),
}

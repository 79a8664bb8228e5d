//! Translation of terminal bytes into velocity commands.
//!
//! The mapping is a plain lookup table ([`KeyMap`]) from an input byte to a
//! [`Command`]. Bytes without an entry map to [`Command::NoOp`].

pub mod command;
pub mod keymap;

pub use command::Command;
pub use keymap::{KeyMap, HELP_BANNER};

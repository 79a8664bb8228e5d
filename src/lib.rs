//! Keyboard teleoperation for wheeled robots.
//!
//! Key presses in the terminal nudge a velocity command which is republished
//! at a fixed rate. See [`control::ControlLoop`] for the tick cycle.

pub mod config;
pub mod control;
pub mod mapping;
pub mod mqtt;
pub mod terminal;
pub mod velocity;

pub use config::TeleopConfig;
pub use control::{ControlLoop, InputSource, Publisher};
pub use mapping::{Command, KeyMap};
pub use velocity::{VelocityState, VELOCITY_STEP};

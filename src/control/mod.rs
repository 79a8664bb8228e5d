//! Fixed-rate teleoperation loop
//!
//! ```text
//! InputSource ──► KeyMap ──► VelocityState ──► Publisher
//!   (poll)        (map)        (apply)         (every tick)
//! ```
//!
//! Everything runs sequentially inside one task. The loop publishes the
//! current state on every tick, whether or not a key arrived.

pub mod control_loop;
pub mod publisher;

use std::time::Duration;

use crate::terminal::TerminalError;

pub use control_loop::{ControlLoop, TickOutcome};
pub use publisher::{LogPublisher, Publisher};

/// Source of single input bytes, polled once per tick
pub trait InputSource {
    /// Returns the pending byte, or `None` when nothing was typed
    fn poll_and_consume(&mut self) -> Result<Option<u8>, TerminalError>;
}

/// Highest supported tick rate; one tick per millisecond
pub const MAX_RATE_HZ: u32 = 1000;

/// Loop timing
#[derive(Clone, Debug)]
pub struct ControlSettings {
    /// Ticks per second, clamped to `1..=MAX_RATE_HZ`
    pub rate_hz: u32,
}

impl ControlSettings {
    /// Tick period, never zero
    pub fn period(&self) -> Duration {
        Duration::from_secs(1) / self.rate_hz.clamp(1, MAX_RATE_HZ)
    }
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self { rate_hz: 50 }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error("Terminal error: {0}")]
    Terminal(#[from] TerminalError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_period_is_twenty_millis() {
        assert_eq!(ControlSettings::default().period(), Duration::from_millis(20));
    }

    #[test]
    fn out_of_range_rates_keep_a_nonzero_period() {
        for rate_hz in [0, MAX_RATE_HZ + 1, 2_000_000_000, u32::MAX] {
            let period = ControlSettings { rate_hz }.period();
            assert!(period >= Duration::from_millis(1), "{rate_hz} Hz gave {period:?}");
        }
    }

    #[test]
    fn period_follows_rate() {
        let settings = ControlSettings { rate_hz: 10 };
        assert_eq!(settings.period(), Duration::from_millis(100));
    }
}

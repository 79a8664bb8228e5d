use chrono::Local;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::{ControlError, ControlSettings, InputSource, Publisher};
use crate::mapping::{Command, KeyMap};
use crate::velocity::VelocityState;

/// What happened during a single tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    /// Byte consumed this tick, if any
    pub byte: Option<u8>,
    /// Command applied to the state (`NoOp` when idle)
    pub command: Command,
    /// State that was published
    pub published: VelocityState,
}

// Counters for the periodic stats line
#[derive(Debug, Default)]
struct LoopStats {
    ticks: u64,
    keypresses: u64,
}

/// Owns the velocity accumulator and drives the poll → apply → publish cycle
pub struct ControlLoop<I: InputSource, P: Publisher> {
    input: I,
    publisher: P,
    keymap: KeyMap,
    state: VelocityState,
    settings: ControlSettings,
    shutdown: CancellationToken,
    stats: LoopStats,
}

impl<I: InputSource, P: Publisher> ControlLoop<I, P> {
    pub fn new(
        input: I,
        publisher: P,
        settings: Option<ControlSettings>,
        shutdown: CancellationToken,
    ) -> Self {
        let settings = settings.unwrap_or_default();
        debug!("Creating control loop with settings: {:?}", settings);
        Self {
            input,
            publisher,
            keymap: KeyMap::default_config(),
            state: VelocityState::new(),
            settings,
            shutdown,
            stats: LoopStats::default(),
        }
    }

    pub fn state(&self) -> &VelocityState {
        &self.state
    }

    /// Polls once, applies any resulting command and publishes the state
    pub fn tick(&mut self) -> Result<TickOutcome, ControlError> {
        let byte = self.input.poll_and_consume()?;

        let command = match byte {
            Some(b) => {
                self.stats.keypresses += 1;
                let command = self.keymap.map(b);
                self.state.apply(command);
                if command != Command::NoOp {
                    debug!("Applied {}: {}", command, self.state);
                }
                command
            }
            None => Command::NoOp,
        };

        self.publisher.publish(&self.state);
        self.stats.ticks += 1;

        Ok(TickOutcome {
            byte,
            command,
            published: self.state,
        })
    }

    /// Runs ticks at the configured rate until the shutdown token is cancelled.
    ///
    /// The token is only checked between ticks. A tick that overruns its
    /// period is followed immediately by the next one; missed ticks are not
    /// made up. Returns the last published state.
    pub async fn run(self) -> Result<VelocityState, ControlError> {
        let (state, _publisher) = self.run_with_publisher().await?;
        Ok(state)
    }

    /// Like [`run`](Self::run) but hands the publisher back for cleanup
    pub async fn run_with_publisher(mut self) -> Result<(VelocityState, P), ControlError> {
        let period = self.settings.period();
        info!(
            "Starting control loop at {} Hz ({:?} period), publishing to {}",
            self.settings.rate_hz,
            period,
            self.publisher.topic()
        );

        let mut interval = time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick of a tokio interval completes immediately
        interval.tick().await;

        let mut last_log_time = Local::now();
        let log_interval = chrono::Duration::seconds(10);

        while !self.shutdown.is_cancelled() {
            self.tick()?;

            let now = Local::now();
            if now - last_log_time > log_interval {
                info!(
                    "Control loop stats: {} ticks, {} keypresses in last {} seconds, state {}",
                    self.stats.ticks,
                    self.stats.keypresses,
                    log_interval.num_seconds(),
                    self.state
                );
                self.stats = LoopStats::default();
                last_log_time = now;
            }

            interval.tick().await;
        }

        info!("Control loop stopped after shutdown request");
        Ok((self.state, self.publisher))
    }
}

//! Output seam of the control loop
//!
//! A [`Publisher`] takes the current velocity once per tick and hands it to
//! whatever transport sits behind it. Publishing never fails from the loop's
//! point of view; transports log their own delivery problems.

use tracing::{debug, trace};

use crate::velocity::VelocityState;

pub trait Publisher {
    /// Delivers one value on the publisher's channel
    fn publish(&mut self, state: &VelocityState);

    /// Channel name the values go to
    fn topic(&self) -> &str;
}

impl<P: Publisher + ?Sized> Publisher for Box<P> {
    fn publish(&mut self, state: &VelocityState) {
        (**self).publish(state)
    }

    fn topic(&self) -> &str {
        (**self).topic()
    }
}

/// Publisher that only writes to the log, used when no broker is configured
#[derive(Debug)]
pub struct LogPublisher {
    topic: String,
    last: Option<VelocityState>,
    published: u64,
}

impl LogPublisher {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            last: None,
            published: 0,
        }
    }

    pub fn published(&self) -> u64 {
        self.published
    }
}

impl Publisher for LogPublisher {
    fn publish(&mut self, state: &VelocityState) {
        self.published += 1;
        if self.last.as_ref() != Some(state) {
            debug!("{} <- {}", self.topic, state);
            self.last = Some(*state);
        } else {
            trace!("{} <- {} (unchanged)", self.topic, state);
        }
    }

    fn topic(&self) -> &str {
        &self.topic
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::Command;

    #[test]
    fn counts_every_publish() {
        let mut publisher = LogPublisher::new("wheel/cmd_vel");
        let mut state = VelocityState::new();

        publisher.publish(&state);
        publisher.publish(&state);
        state.apply(Command::IncreaseForward);
        publisher.publish(&state);

        assert_eq!(publisher.published(), 3);
        assert_eq!(publisher.topic(), "wheel/cmd_vel");
    }

    #[test]
    fn boxed_publisher_forwards() {
        let mut publisher: Box<dyn Publisher> = Box::new(LogPublisher::new("cmd"));
        publisher.publish(&VelocityState::new());
        assert_eq!(publisher.topic(), "cmd");
    }
}

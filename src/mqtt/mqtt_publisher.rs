use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS};
use tokio::select;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::{MqttConfig, PublisherError};
use crate::control::Publisher;
use crate::velocity::VelocityState;

// Pause before polling again after a connection error
const RECONNECT_DELAY: Duration = Duration::from_secs(1);
// Time the network task gets to flush the disconnect
const DISCONNECT_GRACE: Duration = Duration::from_millis(500);

#[derive(Clone, Debug, Default)]
pub struct PublishStats {
    pub sent: u64,
    pub dropped: u64,
    // Drops since the last successful send
    streak: u64,
}

impl PublishStats {
    /// Counts a drop; true only for the first drop of a streak
    fn record_dropped(&mut self) -> bool {
        self.dropped += 1;
        self.streak += 1;
        self.streak == 1
    }

    /// Counts a send; returns the length of the drop streak it ended, if any
    fn record_sent(&mut self) -> Option<u64> {
        self.sent += 1;
        match std::mem::take(&mut self.streak) {
            0 => None,
            ended => Some(ended),
        }
    }

    pub fn dropping(&self) -> bool {
        self.streak > 0
    }
}

pub struct MqttPublisher {
    client: AsyncClient,
    topic: String,
    stats: PublishStats,
    stop: CancellationToken,
    network_task: JoinHandle<()>,
}

impl MqttPublisher {
    /// Registers with the broker and spawns the network task.
    ///
    /// Must be called from within a tokio runtime. The task runs until
    /// [`shutdown`](Self::shutdown) is called.
    pub fn connect(config: &MqttConfig) -> Result<Self, PublisherError> {
        let (host, port) = config.host_port()?;
        info!(
            "Connecting to MQTT broker {}:{} as {}",
            host, port, config.client_id
        );

        let mut options = MqttOptions::new(config.client_id.clone(), host, port);
        options.set_keep_alive(Duration::from_secs(config.keep_alive_secs));
        if let (Some(user), Some(password)) = (&config.user, &config.password) {
            options.set_credentials(user.clone(), password.clone());
        }

        let (client, eventloop) = AsyncClient::new(options, config.queue_capacity.max(1));
        let stop = CancellationToken::new();
        let network_task = tokio::spawn(drive_eventloop(eventloop, stop.clone()));

        Ok(Self {
            client,
            topic: config.topic.clone(),
            stats: PublishStats::default(),
            stop,
            network_task,
        })
    }

    pub fn stats(&self) -> &PublishStats {
        &self.stats
    }

    /// Sends a disconnect and waits for the network task to finish
    pub async fn shutdown(self) {
        if let Err(e) = self.client.try_disconnect() {
            debug!("Disconnect request not queued: {}", e);
        }
        if self.stats.dropping() {
            warn!(
                "Still dropping at shutdown, last {} commands lost",
                self.stats.streak
            );
        }
        info!(
            "MQTT publisher closed: {} sent, {} dropped",
            self.stats.sent, self.stats.dropped
        );

        let mut network_task = self.network_task;
        let finished = match tokio::time::timeout(DISCONNECT_GRACE, &mut network_task).await {
            Ok(result) => result,
            Err(_) => {
                debug!("Disconnect not flushed in time, stopping network task");
                self.stop.cancel();
                network_task.await
            }
        };
        if let Err(e) = finished {
            error!("MQTT network task ended abnormally: {}", e);
        }
    }
}

impl Publisher for MqttPublisher {
    fn publish(&mut self, state: &VelocityState) {
        let payload = match serde_json::to_vec(state) {
            Ok(p) => p,
            Err(e) => {
                error!("Failed to encode velocity command: {}", e);
                self.stats.record_dropped();
                return;
            }
        };

        match self
            .client
            .try_publish(self.topic.as_str(), QoS::AtMostOnce, false, payload)
        {
            Ok(_) => {
                if let Some(lost) = self.stats.record_sent() {
                    info!("Publishing resumed after {} dropped commands", lost);
                }
            }
            Err(e) => {
                if self.stats.record_dropped() {
                    warn!("Velocity command dropped: {}, muting until publishing resumes", e);
                } else {
                    debug!("Velocity command dropped: {}", e);
                }
            }
        }
    }

    fn topic(&self) -> &str {
        &self.topic
    }
}

async fn drive_eventloop(mut eventloop: EventLoop, stop: CancellationToken) {
    loop {
        select! {
            _ = stop.cancelled() => {
                debug!("MQTT network task stopping");
                break;
            }
            event = eventloop.poll() => match event {
                Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                    info!("Connected to MQTT broker: {:?}", ack.code);
                }
                Ok(Event::Incoming(Packet::Disconnect)) => {
                    warn!("Broker closed the connection");
                }
                Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                    debug!("Disconnect sent to broker");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("MQTT connection error: {}, retrying in {:?}", e, RECONNECT_DELAY);
                    select! {
                        _ = stop.cancelled() => break,
                        _ = tokio::time::sleep(RECONNECT_DELAY) => {}
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_rejects_bad_address_before_spawning() {
        let config = MqttConfig {
            url: "broker:notaport".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            MqttPublisher::connect(&config),
            Err(PublisherError::InvalidUrl(_))
        ));
    }

    #[test]
    fn only_first_drop_of_a_streak_is_reported() {
        let mut stats = PublishStats::default();
        let reported: Vec<bool> = (0..5).map(|_| stats.record_dropped()).collect();

        assert_eq!(reported, [true, false, false, false, false]);
        assert_eq!(stats.dropped, 5);
        assert!(stats.dropping());
    }

    #[test]
    fn send_ends_streak_and_rearms_warning() {
        let mut stats = PublishStats::default();
        assert_eq!(stats.record_sent(), None);

        for _ in 0..3 {
            stats.record_dropped();
        }
        assert_eq!(stats.record_sent(), Some(3));
        assert_eq!(stats.record_sent(), None);
        assert!(!stats.dropping());

        assert!(stats.record_dropped());
        assert_eq!((stats.sent, stats.dropped), (3, 4));
    }

    #[tokio::test]
    async fn publishes_count_against_topic() {
        let config = MqttConfig {
            url: "127.0.0.1:1".to_string(),
            topic: "test/cmd_vel".to_string(),
            queue_capacity: 64,
            ..Default::default()
        };
        let mut publisher = MqttPublisher::connect(&config).unwrap();
        assert_eq!(publisher.topic(), "test/cmd_vel");

        publisher.publish(&VelocityState::new());
        let stats = publisher.stats().clone();
        assert_eq!(stats.sent + stats.dropped, 1);

        publisher.shutdown().await;
    }
}

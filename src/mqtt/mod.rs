//! # MQTT transport
//!
//! Delivers velocity commands to a broker so the motion controller can
//! subscribe to them.
//!
//! ```text
//! mqtt/
//! ├── config.rs          - Broker address, credentials and topic
//! └── mqtt_publisher.rs  - Publisher implementation and network task
//! ```
//!
//! The control loop never waits on the network: payloads are queued with
//! `try_publish` and a background task drives the rumqttc event loop.

pub mod config;
pub mod mqtt_publisher;

pub use config::MqttConfig;
pub use mqtt_publisher::MqttPublisher;

#[derive(Debug, thiserror::Error)]
pub enum PublisherError {
    #[error("Invalid broker address: {0}")]
    InvalidUrl(String),
}

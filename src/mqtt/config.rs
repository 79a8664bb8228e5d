use serde::{Deserialize, Serialize};

use super::PublisherError;

/// Broker connection and topic for velocity commands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    /// Publish to a broker; when false commands only go to the log
    pub enabled: bool,
    /// `host:port`, port defaults to 1883
    pub url: String,
    pub client_id: String,
    pub topic: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub keep_alive_secs: u64,
    /// Outgoing requests buffered before publishes are dropped
    pub queue_capacity: usize,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: "localhost:1883".to_string(),
            client_id: "key_operator".to_string(),
            topic: "wheel/cmd_vel".to_string(),
            user: None,
            password: None,
            keep_alive_secs: 5,
            queue_capacity: 10,
        }
    }
}

impl MqttConfig {
    /// Splits `url` into host and port
    pub fn host_port(&self) -> Result<(String, u16), PublisherError> {
        let mut parts = self.url.splitn(2, ':');
        let host = parts.next().unwrap_or_default().trim();
        if host.is_empty() {
            return Err(PublisherError::InvalidUrl(self.url.clone()));
        }

        let port = match parts.next() {
            Some(port) => port
                .trim()
                .parse()
                .map_err(|_| PublisherError::InvalidUrl(self.url.clone()))?,
            None => 1883,
        };

        Ok((host.to_string(), port))
    }
}

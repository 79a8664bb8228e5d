//! Operator settings stored as TOML in the user's config directory
//!
//! Missing files are created with defaults, and every field falls back to its
//! default when absent, so a partial file is always valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::control::{ControlSettings, MAX_RATE_HZ};
use crate::mqtt::MqttConfig;
use crate::terminal::ReaderSettings;

const CONFIG_DIR: &str = "key-operator";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("No config directory available on this platform")]
    NoConfigDir,

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Control rate must be between 1 and {max} Hz, got {0}", max = MAX_RATE_HZ)]
    InvalidRate(u32),
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ControlConfig {
    pub rate_hz: u32,
    /// Longest wait for a key inside one poll; values above 100 are clamped
    pub read_timeout_ms: u64,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            rate_hz: 50,
            read_timeout_ms: 0,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct TeleopConfig {
    pub control: ControlConfig,
    pub mqtt: MqttConfig,
}

impl TeleopConfig {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: TeleopConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let rate_hz = self.control.rate_hz;
        if rate_hz == 0 || rate_hz > MAX_RATE_HZ {
            return Err(ConfigError::InvalidRate(rate_hz));
        }
        Ok(())
    }

    pub fn control_settings(&self) -> ControlSettings {
        ControlSettings {
            rate_hz: self.control.rate_hz,
        }
    }

    pub fn reader_settings(&self) -> ReaderSettings {
        ReaderSettings {
            read_timeout: Duration::from_millis(self.control.read_timeout_ms),
        }
    }

    /// `<config dir>/key-operator/config.toml`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let mut path = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        path.push(CONFIG_DIR);
        path.push(CONFIG_FILE);
        Ok(path)
    }

    /// Writes the default config to `path` unless a file already exists
    pub async fn ensure_default_config(path: &Path) -> Result<(), ConfigError> {
        let exists = tokio::fs::try_exists(path)
            .await
            .map_err(|source| io_error(path, source))?;
        if exists {
            return Ok(());
        }

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| io_error(parent, source))?;
        }

        let content = TeleopConfig::default().to_toml()?;
        tokio::fs::write(path, content)
            .await
            .map_err(|source| io_error(path, source))?;
        info!("Wrote default config to {}", path.display());
        Ok(())
    }

    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::ensure_default_config(path).await?;
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| io_error(path, source))?;
        let config = Self::from_toml(&content)?;
        debug!("Loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }
}

fn io_error(path: &Path, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.to_path_buf(),
        source,
    }
}

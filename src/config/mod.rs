// src/config/mod.rs - Host configuration
use serde::{Deserialize, Serialize};
use std::fs;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub host: HostConfig,

    #[serde(default)]
    pub web: WebConfig,

    #[serde(default)]
    pub stats: StatsConfig,
}

/// Host identity
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HostConfig {
    #[serde(default = "default_host_name")]
    pub name: String,
}

/// Web interface configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_web_port")]
    pub port: u16,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

/// Status poller configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StatsConfig {
    /// How often the poller samples the tracker, in milliseconds.
    #[serde(default = "default_status_interval_ms")]
    pub status_interval_ms: u64,

    /// Whether each sample is written to the log.
    #[serde(default = "default_enabled")]
    pub log_status: bool,
}

// Default value functions
fn default_host_name() -> String {
    "printwatch".to_string()
}
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}
fn default_web_port() -> u16 {
    3000
}
fn default_status_interval_ms() -> u64 {
    1000
}
fn default_enabled() -> bool {
    true
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            name: default_host_name(),
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_web_port(),
            enabled: true,
        }
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            status_interval_ms: default_status_interval_ms(),
            log_status: true,
        }
    }
}

/// Load and validate configuration from a TOML file.
pub fn load_config(config_path: &str) -> Result<Config, ConfigError> {
    let contents = fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
        path: config_path.to_string(),
        source,
    })?;
    let config: Config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: config_path.to_string(),
        source,
    })?;
    config.validate()?;
    tracing::info!("Loaded configuration from {}", config_path);
    Ok(config)
}

impl Config {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.name.is_empty() {
            return Err(ConfigError::Invalid("host name cannot be empty".to_string()));
        }
        if self.stats.status_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "stats.status_interval_ms must be positive".to_string(),
            ));
        }
        if self.web.enabled && self.web.bind_address.is_empty() {
            return Err(ConfigError::Invalid(
                "web.bind_address must be specified when the web API is enabled".to_string(),
            ));
        }
        Ok(())
    }
}

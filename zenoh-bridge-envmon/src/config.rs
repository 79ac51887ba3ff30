//! Configuration for the envmon bridge.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sink::Format;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] json5::Error),
    #[error("validation error: {0}")]
    Validation(String),
}

/// Complete bridge configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Zenoh connection settings.
    #[serde(default)]
    pub zenoh: ZenohConfig,

    /// Collection settings.
    #[serde(default)]
    pub envmon: EnvmonConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Collection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvmonConfig {
    /// Key expression prefix (default: "telemetry").
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Hostname used as the sample source and in key expressions.
    /// "auto" (the default) detects it from the system.
    #[serde(default = "default_hostname")]
    pub hostname: String,

    /// Poll interval in seconds (default: 10).
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Payload serialization format.
    #[serde(default)]
    pub format: Format,

    /// Plugin option table handed to the collector. The collector accepts
    /// no options at all, so any key here fails startup by design of the
    /// upstream contract.
    #[serde(default)]
    pub options: HashMap<String, serde_json::Value>,
}

fn default_key_prefix() -> String {
    "telemetry".to_string()
}

fn default_hostname() -> String {
    "auto".to_string()
}

fn default_poll_interval() -> u64 {
    10
}

impl Default for EnvmonConfig {
    fn default() -> Self {
        Self {
            key_prefix: default_key_prefix(),
            hostname: default_hostname(),
            poll_interval_secs: default_poll_interval(),
            format: Format::default(),
            options: HashMap::new(),
        }
    }
}

/// Zenoh connection mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZenohMode {
    Client,
    #[default]
    Peer,
    Router,
}

impl ZenohMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ZenohMode::Client => "client",
            ZenohMode::Peer => "peer",
            ZenohMode::Router => "router",
        }
    }
}

/// Zenoh connection settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ZenohConfig {
    /// Session mode.
    #[serde(default)]
    pub mode: ZenohMode,

    /// Endpoints to connect to (client mode).
    #[serde(default)]
    pub connect: Vec<String>,

    /// Endpoints to listen on (peer/router mode).
    #[serde(default)]
    pub listen: Vec<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl BridgeConfig {
    /// Load configuration from a JSON5 file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: BridgeConfig = json5::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.envmon.poll_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "poll_interval_secs must be > 0".to_string(),
            ));
        }
        if self.envmon.key_prefix.is_empty() {
            return Err(ConfigError::Validation(
                "key_prefix must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Hostname to use, resolving "auto" if needed.
    pub fn hostname(&self) -> String {
        if self.envmon.hostname == "auto" {
            hostname::get()
                .ok()
                .and_then(|h| h.into_string().ok())
                .unwrap_or_else(|| "unknown".to_string())
        } else {
            self.envmon.hostname.clone()
        }
    }
}

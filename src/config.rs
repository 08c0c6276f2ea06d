//! Runtime configuration, read from the environment.

use std::fmt;
use std::net::SocketAddr;

use crate::validate::TimestampPolicy;

pub const ENV_BIND_ADDR: &str = "ALERTS_BIND_ADDR";
pub const ENV_LOG_LEVEL: &str = "ALERTS_LOG_LEVEL";
pub const ENV_LOG_JSON: &str = "ALERTS_LOG_JSON";
pub const ENV_STRICT_TIMESTAMPS: &str = "ALERTS_STRICT_TIMESTAMPS";

/// Settings for the alert service binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Address the HTTP server listens on.
    pub bind_addr: SocketAddr,
    /// Default log filter, used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Emit logs as JSON lines.
    pub log_json: bool,
    pub timestamp_policy: TimestampPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 7071)),
            log_level: "info".into(),
            log_json: false,
            timestamp_policy: TimestampPolicy::Lenient,
        }
    }
}

impl Config {
    /// Defaults overridden by `ALERTS_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each key.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(raw) = lookup(ENV_BIND_ADDR) {
            config.bind_addr = raw
                .parse()
                .map_err(|_| ConfigError::invalid(ENV_BIND_ADDR, &raw))?;
        }
        if let Some(raw) = lookup(ENV_LOG_LEVEL) {
            if raw.trim().is_empty() {
                return Err(ConfigError::invalid(ENV_LOG_LEVEL, &raw));
            }
            config.log_level = raw;
        }
        if let Some(raw) = lookup(ENV_LOG_JSON) {
            config.log_json = parse_flag(ENV_LOG_JSON, &raw)?;
        }
        if let Some(raw) = lookup(ENV_STRICT_TIMESTAMPS) {
            if parse_flag(ENV_STRICT_TIMESTAMPS, &raw)? {
                config.timestamp_policy = TimestampPolicy::StrictIso;
            }
        }

        Ok(config)
    }
}

fn parse_flag(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid(key, raw)),
    }
}

/// Error type for configuration loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { key: &'static str, value: String },
}

impl ConfigError {
    fn invalid(key: &'static str, value: &str) -> Self {
        ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidValue { key, value } => {
                write!(f, "invalid value for {}: {:?}", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

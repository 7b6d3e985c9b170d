//! Client configuration with validation.

use crate::domain::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable overriding [`ClientConfig::default_timeout`].
pub const ENV_TIMEOUT: &str = "LEDGER_WS_TIMEOUT";
/// Environment variable overriding [`ClientConfig::reaper_interval`].
pub const ENV_REAPER_INTERVAL: &str = "LEDGER_WS_REAPER_INTERVAL";
/// Environment variable overriding [`ClientConfig::max_frame_size`].
pub const ENV_MAX_FRAME_SIZE: &str = "LEDGER_WS_MAX_FRAME_SIZE";

/// Upper bound on [`ClientConfig::reaper_interval`]; the sweep timer cannot
/// schedule arbitrarily far ahead.
pub const MAX_REAPER_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Deadline applied by `request` when the caller gives none
    #[serde(with = "humantime_serde")]
    pub default_timeout: Duration,
    /// Period of the sweep that fails calls past their deadline
    #[serde(with = "humantime_serde")]
    pub reaper_interval: Duration,
    /// Inbound frames above this size are rejected unparsed
    pub max_frame_size: usize,
    /// Capacity of the unsolicited-frame broadcast
    pub unsolicited_buffer: usize,
    /// Capacity of the diagnostics broadcast
    pub diagnostics_buffer: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_secs(30),
            reaper_interval: Duration::from_secs(5),
            max_frame_size: 1024 * 1024, // 1 MB
            unsolicited_buffer: 256,
            diagnostics_buffer: 64,
        }
    }
}

impl ClientConfig {
    /// Defaults overlaid with `LEDGER_WS_*` environment variables.
    /// Unparsable values are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(timeout) = lookup(ENV_TIMEOUT).and_then(|v| humantime_serde::parse_duration(&v).ok()) {
            config.default_timeout = timeout;
        }
        if let Some(interval) =
            lookup(ENV_REAPER_INTERVAL).and_then(|v| humantime_serde::parse_duration(&v).ok())
        {
            config.reaper_interval = interval;
        }
        if let Some(size) = lookup(ENV_MAX_FRAME_SIZE).and_then(|v| v.trim().parse().ok()) {
            config.max_frame_size = size;
        }
        config
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_timeout.is_zero() {
            return Err(invalid("default_timeout", "cannot be 0"));
        }
        if self.reaper_interval.is_zero() {
            return Err(invalid("reaper_interval", "cannot be 0"));
        }
        if self.reaper_interval > MAX_REAPER_INTERVAL {
            return Err(invalid("reaper_interval", "cannot exceed 24h"));
        }
        if self.max_frame_size == 0 {
            return Err(invalid("max_frame_size", "cannot be 0"));
        }
        if self.unsolicited_buffer == 0 {
            return Err(invalid("unsolicited_buffer", "cannot be 0"));
        }
        if self.diagnostics_buffer == 0 {
            return Err(invalid("diagnostics_buffer", "cannot be 0"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.to_string(),
    }
}

/// Humane duration strings: `"30s"`, `"500ms"`, `"2m"` or plain seconds.
mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if duration.subsec_millis() == 0 {
            serializer.serialize_str(&format!("{}s", duration.as_secs()))
        } else {
            serializer.serialize_str(&format!("{}ms", duration.as_millis()))
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }

    pub fn parse_duration(s: &str) -> Result<Duration, &'static str> {
        let s = s.trim();
        if let Some(ms) = s.strip_suffix("ms") {
            ms.trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| "invalid milliseconds")
        } else if let Some(secs) = s.strip_suffix('s') {
            secs.trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid seconds")
        } else if let Some(mins) = s.strip_suffix('m') {
            mins.trim()
                .parse::<u64>()
                .ok()
                .and_then(|m| m.checked_mul(60))
                .map(Duration::from_secs)
                .ok_or("invalid minutes")
        } else {
            s.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid duration format")
        }
    }
}

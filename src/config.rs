//! Configuration module for tubewatch.

use serde::Deserialize;
use std::path::Path;

use crate::{Result, TubewatchError};

/// A monitored YouTube channel.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelConfig {
    /// Channel id (the `UC...` identifier used in the feed URL).
    pub id: String,
    /// Display name used in logs.
    #[serde(default = "default_channel_name")]
    pub name: String,
}

fn default_channel_name() -> String {
    "Unknown".to_string()
}

/// Monitor pass configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Minimum pacing delay between notifications, in seconds.
    #[serde(default = "default_delay_min")]
    pub delay_min_secs: u64,
    /// Maximum pacing delay between notifications, in seconds.
    #[serde(default = "default_delay_max")]
    pub delay_max_secs: u64,
    /// HTTP connect timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// HTTP read timeout in seconds.
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,
    /// Total HTTP request timeout in seconds.
    #[serde(default = "default_total_timeout")]
    pub total_timeout_secs: u64,
}

fn default_delay_min() -> u64 {
    5
}

fn default_delay_max() -> u64 {
    60
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_read_timeout() -> u64 {
    20
}

fn default_total_timeout() -> u64 {
    30
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            delay_min_secs: default_delay_min(),
            delay_max_secs: default_delay_max(),
            connect_timeout_secs: default_connect_timeout(),
            read_timeout_secs: default_read_timeout(),
            total_timeout_secs: default_total_timeout(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Optional log file path. Console-only when absent.
    #[serde(default)]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Discord webhook URL notifications are posted to.
    #[serde(default)]
    pub webhook_url: String,
    /// Channels to monitor.
    #[serde(default)]
    pub channels: Vec<ChannelConfig>,
    /// Monitor pass settings.
    #[serde(default)]
    pub monitor: MonitorConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(TubewatchError::Io)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| TubewatchError::Config(format!("config parse error: {e}")))
    }

    /// Validate the configuration before a pass starts.
    ///
    /// Channels with an empty id are tolerated here (the monitor skips them
    /// with a log line); an unusable webhook or inverted delay bounds are
    /// fatal.
    pub fn validate(&self) -> Result<()> {
        if self.webhook_url.is_empty() {
            return Err(TubewatchError::Config(
                "webhook_url is not configured".to_string(),
            ));
        }
        if self.monitor.delay_min_secs > self.monitor.delay_max_secs {
            return Err(TubewatchError::Config(format!(
                "delay_min_secs ({}) exceeds delay_max_secs ({})",
                self.monitor.delay_min_secs, self.monitor.delay_max_secs
            )));
        }
        Ok(())
    }
}

//! Configuration sections.

use rolodex_telemetry::{LogConfig, LogFormat};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::ConfigError;

/// Root configuration.
///
/// # Example
///
/// ```
/// use rolodex_config::RolodexConfig;
///
/// let config = RolodexConfig::default();
/// assert_eq!(config.server.addr(), "0.0.0.0:8080");
/// assert!(config.seed);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RolodexConfig {
    /// Whether to load the sample contacts at startup.
    #[serde(default = "default_seed")]
    pub seed: bool,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerSettings,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Default for RolodexConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            server: ServerSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl RolodexConfig {
    /// Checks values that parse but cannot be used.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::invalid(
                "server.host",
                "must not be empty",
            ));
        }

        if self.server.static_dir.as_os_str().is_empty() {
            return Err(ConfigError::invalid(
                "server.static_dir",
                "must not be empty",
            ));
        }

        let timeouts = [
            ("server.read_timeout_secs", self.server.read_timeout_secs),
            ("server.write_timeout_secs", self.server.write_timeout_secs),
            ("server.idle_timeout_secs", self.server.idle_timeout_secs),
            (
                "server.shutdown_timeout_secs",
                self.server.shutdown_timeout_secs,
            ),
        ];
        for (field, secs) in timeouts {
            if secs == 0 {
                return Err(ConfigError::invalid(field, "must be greater than 0"));
            }
        }

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::invalid(
                "logging.level",
                "must not be empty",
            ));
        }

        Ok(())
    }
}

/// HTTP server section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServerSettings {
    /// Interface to bind (hostname or IP).
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory served under `/static/`.
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,

    /// Time allowed to receive request headers and body.
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,

    /// Time allowed to produce a response.
    #[serde(default = "default_write_timeout")]
    pub write_timeout_secs: u64,

    /// Keep-alive connections with no traffic for this long are closed.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,

    /// Grace period for in-flight connections on shutdown.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
            read_timeout_secs: default_read_timeout(),
            write_timeout_secs: default_write_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            shutdown_timeout_secs: default_shutdown_timeout(),
        }
    }
}

impl ServerSettings {
    /// Bind address as `host:port`.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Read timeout as a [`Duration`].
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    /// Write timeout as a [`Duration`].
    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }

    /// Idle timeout as a [`Duration`].
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// Shutdown grace period as a [`Duration`].
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

/// Logging section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingSettings {
    /// Filter directive, e.g. `info` or `rolodex_server=debug`.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Line format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl LoggingSettings {
    /// Builds the subscriber configuration for these settings.
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            level: self.level.clone(),
            format: self.format,
            ..LogConfig::default()
        }
    }
}

fn default_seed() -> bool {
    true
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}

fn default_read_timeout() -> u64 {
    5
}

fn default_write_timeout() -> u64 {
    10
}

fn default_idle_timeout() -> u64 {
    120
}

fn default_shutdown_timeout() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

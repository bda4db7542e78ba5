//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Why a configuration could not be loaded.
///
/// Every variant names the layer or field at fault, so the binary can print
/// the error and exit without further context.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An explicitly requested file does not exist.
    #[error("config file {} does not exist", path.display())]
    Missing {
        /// Requested path.
        path: PathBuf,
    },

    /// A config file exists but could not be read.
    #[error("cannot read config file {}", path.display())]
    Unreadable {
        /// Path of the file.
        path: PathBuf,
        /// I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The file or string is neither TOML nor JSON.
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// Malformed TOML, or TOML with unknown keys.
    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    /// Malformed JSON, or JSON with unknown keys.
    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    /// A `.env` file is present but malformed.
    #[error("invalid .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),

    /// A `ROLODEX_*` variable holds a value of the wrong type.
    #[error("{var}: {reason}")]
    Env {
        /// Variable name.
        var: String,
        /// What was expected.
        reason: String,
    },

    /// A setting parsed but cannot be used.
    #[error("{field} {reason}")]
    Invalid {
        /// Dotted path of the setting, e.g. `server.port`.
        field: String,
        /// What is wrong with it.
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn missing(path: impl Into<PathBuf>) -> Self {
        Self::Missing { path: path.into() }
    }

    pub(crate) fn unreadable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Unreadable {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn env(var: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Env {
            var: var.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_names_path() {
        let err = ConfigError::missing("/etc/rolodex.toml");
        assert_eq!(err.to_string(), "config file /etc/rolodex.toml does not exist");
    }

    #[test]
    fn test_env_names_variable() {
        let err = ConfigError::env("ROLODEX_PORT", "expected port number");
        assert_eq!(err.to_string(), "ROLODEX_PORT: expected port number");
    }

    #[test]
    fn test_invalid_names_field() {
        let err = ConfigError::invalid("server.host", "must not be empty");
        assert_eq!(err.to_string(), "server.host must not be empty");
    }

    #[test]
    fn test_unreadable_keeps_source() {
        use std::error::Error as _;

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = ConfigError::unreadable("rolodex.toml", io);
        assert!(err.source().is_some());
    }
}

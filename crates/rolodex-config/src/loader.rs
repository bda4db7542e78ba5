//! Configuration loader with layered approach.
//!
//! This module provides the [`ConfigLoader`] for loading configuration from
//! defaults, files, `.env` and environment variables.

use std::env;
use std::fs;
use std::path::Path;

use rolodex_telemetry::LogFormat;

use crate::{ConfigError, RolodexConfig};

/// Prefix of every environment variable the loader reads.
pub const ENV_PREFIX: &str = "ROLODEX";

/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_VAR: &str = "ROLODEX_CONFIG";

/// File picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "rolodex.toml";

/// Configuration loader with layered approach.
///
/// Layers are applied in call order, later layers replacing earlier ones.
/// Environment overrides are applied last, inside [`load`](Self::load).
///
/// # Example
///
/// ```no_run
/// use rolodex_config::ConfigLoader;
///
/// # fn main() -> Result<(), rolodex_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_defaults()
///     .with_file("rolodex.toml")?
///     .with_env_prefix("ROLODEX")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: RolodexConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: RolodexConfig::default(),
            env_prefix: None,
        }
    }

    /// Loads configuration the way the `rolodex` binary does.
    ///
    /// Reads `.env`, then the file named by `ROLODEX_CONFIG` (required to
    /// exist when set) or `rolodex.toml` if present, then `ROLODEX_*`
    /// variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any layer fails to parse or the result is invalid.
    pub fn from_environment() -> Result<RolodexConfig, ConfigError> {
        let loader = Self::new().with_defaults().with_dotenv()?;

        let loader = match env::var(CONFIG_PATH_VAR) {
            Ok(path) if !path.is_empty() => loader.with_file(path)?,
            _ => loader.with_optional_file(DEFAULT_CONFIG_FILE)?,
        };

        loader.with_env_prefix(ENV_PREFIX).load()
    }

    /// Start with default configuration values.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = RolodexConfig::default();
        self
    }

    /// Load configuration from a file.
    ///
    /// Supports TOML (.toml) and JSON (.json) formats, chosen by extension.
    /// Sections and fields missing from the file keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing, unreadable, malformed,
    /// or contains unknown fields.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::missing(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::unreadable(path, e))?;

        self.config = Self::parse_file(&content, path)?;
        Ok(self)
    }

    /// Load configuration from a file if it exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be loaded.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string in the given format (`toml` or `json`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails.
    ///
    /// # Example
    ///
    /// ```
    /// use rolodex_config::ConfigLoader;
    ///
    /// let toml = r#"
    ///     [server]
    ///     port = 3000
    /// "#;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string(toml, "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.server.addr(), "0.0.0.0:3000");
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            _ => {
                return Err(ConfigError::UnsupportedFormat(format.to_string()))
            }
        };
        Ok(self)
    }

    /// Set environment variable prefix for overrides.
    ///
    /// Variables use the flat form `PREFIX_KEY`, e.g. `ROLODEX_PORT=9000`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load a `.env` file from the working directory into the process
    /// environment. A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Dotenv` if the file exists but cannot be parsed.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if e.not_found() => Ok(self),
            Err(e) => Err(e.into()),
        }
    }

    /// Finalize and return the loaded configuration.
    ///
    /// Applies environment variable overrides (if a prefix was set) and
    /// validates the result.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an environment value does not parse or
    /// validation fails.
    pub fn load(mut self) -> Result<RolodexConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix)?;
        }

        self.config.validate()?;

        Ok(self.config)
    }

    fn parse_file(content: &str, path: &Path) -> Result<RolodexConfig, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("toml") => Ok(toml::from_str(content)?),
            Some("json") => Ok(serde_json::from_str(content)?),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let scoped = format!("{prefix}_");
        let mut vars: Vec<(String, String)> =
            env::vars().filter(|(k, _)| k.starts_with(&scoped)).collect();
        vars.sort();

        for (key, value) in vars {
            self.apply_env_var(&key, &value, prefix)?;
        }

        Ok(())
    }

    // Empty values are treated as unset.
    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let name = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix('_'))
            .ok_or_else(|| ConfigError::env(key, "invalid key format"))?;

        let value = value.trim();
        if value.is_empty() {
            return Ok(());
        }

        let server = &mut self.config.server;
        match name {
            "HOST" => server.host = value.to_string(),
            "PORT" => {
                server.port = value
                    .parse()
                    .map_err(|_| ConfigError::env(key, "expected port number"))?;
            }
            "STATIC_DIR" => server.static_dir = value.into(),
            "READ_TIMEOUT_SECS" => server.read_timeout_secs = parse_secs(key, value)?,
            "WRITE_TIMEOUT_SECS" => server.write_timeout_secs = parse_secs(key, value)?,
            "IDLE_TIMEOUT_SECS" => server.idle_timeout_secs = parse_secs(key, value)?,
            "SHUTDOWN_TIMEOUT_SECS" => server.shutdown_timeout_secs = parse_secs(key, value)?,

            "SEED" => {
                self.config.seed = parse_bool(value)
                    .ok_or_else(|| ConfigError::env(key, "expected boolean"))?;
            }

            "LOG_LEVEL" => self.config.logging.level = value.to_string(),
            "LOG_FORMAT" => {
                self.config.logging.format = value.parse::<LogFormat>().map_err(|_| {
                    ConfigError::env(key, "expected 'pretty', 'json' or 'compact'")
                })?;
            }

            // ROLODEX_CONFIG and anything unrecognized
            _ => {}
        }

        Ok(())
    }
}

fn parse_secs(key: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::env(key, "expected whole number of seconds"))
}

/// Parse a boolean from a string.
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn test_loader_new() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config.server.addr(), "0.0.0.0:8080");
        assert!(config.seed);
    }

    #[test]
    fn test_loader_with_string_toml() {
        let toml = r#"
            seed = false

            [server]
            host = "127.0.0.1"
            port = 3000

            [logging]
            format = "json"
        "#;

        let config = ConfigLoader::new()
            .with_string(toml, "toml")
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.server.addr(), "127.0.0.1:3000");
        assert!(!config.seed);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.server.idle_timeout_secs, 120);
    }

    #[test]
    fn test_loader_with_string_json() {
        let json = r#"{"server": {"port": 3000, "static_dir": "public"}}"#;

        let config = ConfigLoader::new()
            .with_string(json, "json")
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.static_dir, PathBuf::from("public"));
    }

    #[test]
    fn test_loader_with_string_unknown_format() {
        let result = ConfigLoader::new().with_string("", "yaml");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_loader_with_file_not_found() {
        let result = ConfigLoader::new().with_file("/nonexistent/rolodex.toml");
        assert!(matches!(result, Err(ConfigError::Missing { .. })));
    }

    #[test]
    fn test_loader_with_optional_file_not_found() {
        let config = ConfigLoader::new()
            .with_optional_file("/nonexistent/rolodex.toml")
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_loader_with_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[server]\nport = 4321\nshutdown_timeout_secs = 3").unwrap();

        let config = ConfigLoader::new()
            .with_file(file.path())
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.server.port, 4321);
        assert_eq!(config.server.shutdown_timeout_secs, 3);
    }

    #[test]
    fn test_loader_with_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        writeln!(file, r#"{{"seed": false}}"#).unwrap();

        let config = ConfigLoader::new()
            .with_file(file.path())
            .unwrap()
            .load()
            .unwrap();

        assert!(!config.seed);
    }

    #[test]
    fn test_loader_rejects_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        let result = ConfigLoader::new().with_file(file.path());
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_loader_rejects_unknown_field_in_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[server]\nworkers = 4").unwrap();

        let result = ConfigLoader::new().with_file(file.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_load_validates() {
        let result = ConfigLoader::new()
            .with_string("[server]\nread_timeout_secs = 0", "toml")
            .unwrap()
            .load();
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_env_var_server_fields() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var("ROLODEX_HOST", "127.0.0.1", "ROLODEX")
            .unwrap();
        loader
            .apply_env_var("ROLODEX_PORT", "9090", "ROLODEX")
            .unwrap();
        loader
            .apply_env_var("ROLODEX_STATIC_DIR", "/srv/assets", "ROLODEX")
            .unwrap();
        loader
            .apply_env_var("ROLODEX_WRITE_TIMEOUT_SECS", "30", "ROLODEX")
            .unwrap();

        let config = loader.load().unwrap();
        assert_eq!(config.server.addr(), "127.0.0.1:9090");
        assert_eq!(config.server.static_dir, PathBuf::from("/srv/assets"));
        assert_eq!(config.server.write_timeout_secs, 30);
    }

    #[test]
    fn test_env_var_invalid_port() {
        let mut loader = ConfigLoader::new();
        let result = loader.apply_env_var("ROLODEX_PORT", "eighty", "ROLODEX");
        assert!(matches!(result, Err(ConfigError::Env { .. })));

        let result = loader.apply_env_var("ROLODEX_PORT", "70000", "ROLODEX");
        assert!(matches!(result, Err(ConfigError::Env { .. })));
    }

    #[test]
    fn test_env_var_empty_value_is_ignored() {
        let mut loader = ConfigLoader::new();
        loader.apply_env_var("ROLODEX_HOST", "", "ROLODEX").unwrap();
        loader.apply_env_var("ROLODEX_PORT", "  ", "ROLODEX").unwrap();

        let config = loader.load().unwrap();
        assert_eq!(config.server.addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_env_var_seed() {
        for (value, expected) in [("false", false), ("0", false), ("off", false), ("TRUE", true)] {
            let mut loader = ConfigLoader::new();
            loader.apply_env_var("ROLODEX_SEED", value, "ROLODEX").unwrap();
            assert_eq!(loader.config.seed, expected, "ROLODEX_SEED={value}");
        }

        let mut loader = ConfigLoader::new();
        assert!(loader
            .apply_env_var("ROLODEX_SEED", "maybe", "ROLODEX")
            .is_err());
    }

    #[test]
    fn test_env_var_logging() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var("ROLODEX_LOG_LEVEL", "debug", "ROLODEX")
            .unwrap();
        loader
            .apply_env_var("ROLODEX_LOG_FORMAT", "compact", "ROLODEX")
            .unwrap();
        assert_eq!(loader.config.logging.level, "debug");
        assert_eq!(loader.config.logging.format, LogFormat::Compact);

        assert!(loader
            .apply_env_var("ROLODEX_LOG_FORMAT", "xml", "ROLODEX")
            .is_err());
    }

    #[test]
    fn test_env_var_unknown_key_ignored() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var("ROLODEX_CONFIG", "/etc/rolodex.toml", "ROLODEX")
            .unwrap();
        loader
            .apply_env_var("ROLODEX_UNKNOWN", "whatever", "ROLODEX")
            .unwrap();
        assert_eq!(loader.config, RolodexConfig::default());
    }

    #[test]
    fn test_env_var_invalid_key_format() {
        let mut loader = ConfigLoader::new();
        let result = loader.apply_env_var("OTHER_PORT", "1", "ROLODEX");
        assert!(matches!(result, Err(ConfigError::Env { .. })));
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("yes"), Some(true));
        assert_eq!(parse_bool("On"), Some(true));
        assert_eq!(parse_bool("no"), Some(false));
        assert_eq!(parse_bool(""), None);
    }
}

//! Typed configuration for Rolodex.
//!
//! Configuration is layered, later layers overriding earlier ones:
//!
//! 1. Defaults built into the code
//! 2. An optional TOML or JSON file (unknown fields are rejected)
//! 3. A `.env` file in the working directory
//! 4. `ROLODEX_*` environment variables
//!
//! # Example
//!
//! ```no_run
//! use rolodex_config::ConfigLoader;
//!
//! # fn main() -> Result<(), rolodex_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_defaults()
//!     .with_optional_file("rolodex.toml")?
//!     .with_env_prefix("ROLODEX")
//!     .load()?;
//!
//! println!("Server will listen on: {}", config.server.addr());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! seed = true
//!
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//! static_dir = "static"
//! read_timeout_secs = 5
//! write_timeout_secs = 10
//! idle_timeout_secs = 120
//! shutdown_timeout_secs = 10
//!
//! [logging]
//! level = "info"
//! format = "pretty"
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Field |
//! |---|---|
//! | `ROLODEX_CONFIG` | path of the configuration file |
//! | `ROLODEX_HOST` | `server.host` |
//! | `ROLODEX_PORT` | `server.port` |
//! | `ROLODEX_SEED` | `seed` |
//! | `ROLODEX_STATIC_DIR` | `server.static_dir` |
//! | `ROLODEX_READ_TIMEOUT_SECS` | `server.read_timeout_secs` |
//! | `ROLODEX_WRITE_TIMEOUT_SECS` | `server.write_timeout_secs` |
//! | `ROLODEX_IDLE_TIMEOUT_SECS` | `server.idle_timeout_secs` |
//! | `ROLODEX_SHUTDOWN_TIMEOUT_SECS` | `server.shutdown_timeout_secs` |
//! | `ROLODEX_LOG_LEVEL` | `logging.level` |
//! | `ROLODEX_LOG_FORMAT` | `logging.format` |

#![doc(html_root_url = "https://docs.rs/rolodex-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;

pub use config::{LoggingSettings, RolodexConfig, ServerSettings};
pub use error::ConfigError;
pub use loader::{ConfigLoader, CONFIG_PATH_VAR, DEFAULT_CONFIG_FILE, ENV_PREFIX};
pub use rolodex_telemetry::LogFormat;

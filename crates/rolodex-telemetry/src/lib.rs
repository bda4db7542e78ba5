//! Structured logging for Rolodex.
//!
//! Every crate in the workspace logs through the `tracing` macros. This crate
//! installs the process-wide subscriber that turns those events into
//! human-readable or JSON lines on stdout.
//!
//! # Example
//!
//! ```rust,ignore
//! use rolodex_telemetry::{init_logging, LogConfig, LogFormat};
//!
//! let config = LogConfig {
//!     format: LogFormat::Json,
//!     ..LogConfig::default()
//! };
//! init_logging(&config)?;
//!
//! tracing::info!(port = 8080, "server starting");
//! ```

#![doc(html_root_url = "https://docs.rs/rolodex-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig, LogFormat};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

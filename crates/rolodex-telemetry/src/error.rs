//! Telemetry error types.

use thiserror::Error;

/// Errors that can occur while setting up telemetry.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Failed to initialize logging.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// A log format name was not recognized.
    #[error("Unknown log format '{0}' (expected pretty, json or compact)")]
    UnknownFormat(String),
}

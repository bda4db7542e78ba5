//! The middleware stages of the standard pipeline.
//!
//! 1. [`request_id`] - assign the request ID
//! 2. [`recovery`] - convert panics into 500 responses
//! 3. [`access_log`] - log each completed request

pub mod access_log;
pub mod recovery;
pub mod request_id;

pub use access_log::{AccessLogMiddleware, AccessLogRecord};
pub use recovery::RecoveryMiddleware;
pub use request_id::{RequestIdMiddleware, REQUEST_ID_HEADER};

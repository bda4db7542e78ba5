//! # Rolodex Middleware
//!
//! Middleware pipeline for the Rolodex HTTP server.
//!
//! Every request flows through the same three stages, outermost first:
//!
//! ```text
//! Request → RequestId → Recovery → AccessLog → Handler
//!                                                 ↓
//! Response ← RequestId ← Recovery ← AccessLog ←───┘
//! ```
//!
//! | Stage | Middleware | Purpose |
//! |-------|------------|---------|
//! | 1 | Request ID | Assign a UUID v7 and echo it as `X-Request-ID` |
//! | 2 | Recovery | Turn a handler panic into a plain 500 response |
//! | 3 | Access Log | Log method, path, status and duration |
//!
//! ## Example
//!
//! ```
//! use rolodex_middleware::pipeline::{Pipeline, Stage};
//!
//! let pipeline = Pipeline::standard();
//! assert_eq!(pipeline.stage_names(), ["request_id", "recovery", "access_log"]);
//! assert_eq!(Stage::all()[0].name(), "request_id");
//! ```

#![doc(html_root_url = "https://docs.rs/rolodex-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod context;
pub mod middleware;
pub mod pipeline;
pub mod stages;
pub mod types;

pub use context::MiddlewareContext;
pub use middleware::{BoxFuture, Middleware, Next};
pub use pipeline::{Pipeline, PipelineBuilder, Stage};
pub use types::{Request, Response, ResponseExt};

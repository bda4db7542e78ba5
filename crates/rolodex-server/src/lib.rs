//! # Rolodex Server
//!
//! HTTP surface of the Rolodex contact manager.
//!
//! - [`Server`] - Hyper HTTP/1.1 accept loop with timeouts and graceful shutdown
//! - [`App`] - Middleware pipeline, routing and handlers for one request
//! - [`router`] - Method + path template matching with 404/405 detection
//! - [`render`] - `maud` pages and htmx partials
//! - [`static_files`] - Assets under `/static/` with `ETag` revalidation
//!
//! ## Routes
//!
//! | Method | Path | Response |
//! |--------|------|----------|
//! | GET | `/` | landing page |
//! | GET | `/contacts?q=` | contacts page (rows only for htmx) |
//! | GET | `/contacts/search?q=` | rows partial |
//! | GET | `/contacts/new` | empty form |
//! | POST | `/contacts` | 303 to `/contacts`, or the form again with 422 |
//! | GET | `/contacts/{id}/edit` | pre-filled form, or 404 |
//! | POST | `/contacts/{id}` | 303, 404, or 422 |
//! | DELETE | `/contacts/{id}` | 200 empty (htmx) or 303; 404 if unknown |
//! | GET/HEAD | `/static/...` | static assets |
//!
//! ## Example
//!
//! ```rust,ignore
//! use rolodex_core::MemoryStore;
//! use rolodex_server::{Server, ServerConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MemoryStore::new();
//!     store.seed();
//!
//!     let config = ServerConfig::builder().http_addr("127.0.0.1:8080").build();
//!     Server::new(config, Arc::new(store)).run().await?;
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/rolodex-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod app;
mod config;
mod handlers;
pub mod render;
mod request;
mod response;
pub mod router;
mod server;
mod shutdown;
pub mod static_files;

pub use app::{App, STATIC_PREFIX};
pub use config::{
    ServerConfig, ServerConfigBuilder, DEFAULT_HTTP_ADDR, DEFAULT_IDLE_TIMEOUT_SECS,
    DEFAULT_MAX_BODY_BYTES, DEFAULT_READ_TIMEOUT_SECS, DEFAULT_SHUTDOWN_TIMEOUT_SECS,
    DEFAULT_STATIC_DIR, DEFAULT_WRITE_TIMEOUT_SECS,
};
pub use handlers::{routes, HandlerResult, Handlers, Route};
pub use request::{ContactForm, HandlerRequest, HX_REQUEST_HEADER};
pub use server::{Server, ServerError};
pub use shutdown::{
    ActivityGuard, ConnectionActivity, ConnectionToken, ConnectionTracker, ShutdownSignal,
};

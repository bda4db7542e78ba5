//! # Rolodex
//!
//! A server-rendered contact manager. Pages come from the server as HTML;
//! htmx swaps in partials for live search and in-place delete.
//!
//! This crate wires the workspace together and hosts the `rolodex` binary:
//!
//! ```text
//! rolodex-config ──► RolodexConfig ──► ServerConfig ──► rolodex-server
//!                                          │
//! rolodex-core ──► MemoryStore (seeded) ───┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use rolodex::config::ConfigLoader;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::from_environment()?;
//!     rolodex::run(config).await
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/rolodex/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

use anyhow::Context;
use rolodex_config::RolodexConfig;
use rolodex_core::MemoryStore;
use rolodex_server::{Server, ServerConfig, ShutdownSignal};
use std::sync::Arc;
use tracing::info;

pub use rolodex_config as config;
pub use rolodex_core as core;
pub use rolodex_middleware as middleware;
pub use rolodex_server as server;
pub use rolodex_telemetry as telemetry;

/// Crate version, reported by `rolodex --version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maps the file/env configuration onto the server's settings.
#[must_use]
pub fn server_config(config: &RolodexConfig) -> ServerConfig {
    let server = &config.server;
    ServerConfig::builder()
        .http_addr(server.addr())
        .static_dir(server.static_dir.clone())
        .read_timeout(server.read_timeout())
        .write_timeout(server.write_timeout())
        .idle_timeout(server.idle_timeout())
        .shutdown_timeout(server.shutdown_timeout())
        .build()
}

/// Creates the contact store, loading the sample contacts when `seed` is on.
#[must_use]
pub fn build_store(config: &RolodexConfig) -> Arc<MemoryStore> {
    let store = MemoryStore::new();
    if config.seed {
        let added = store.seed();
        info!(contacts = added, "loaded sample contacts");
    }
    Arc::new(store)
}

/// Runs the server until SIGINT or SIGTERM.
///
/// # Errors
///
/// Returns an error if the server cannot bind its address.
pub async fn run(config: RolodexConfig) -> anyhow::Result<()> {
    run_until(config, ShutdownSignal::with_os_signals()).await
}

/// Runs the server until `shutdown` fires.
///
/// # Errors
///
/// Returns an error if the server cannot bind its address.
pub async fn run_until(config: RolodexConfig, shutdown: ShutdownSignal) -> anyhow::Result<()> {
    let server_config = server_config(&config);
    let store = build_store(&config);

    info!(
        version = VERSION,
        addr = server_config.http_addr(),
        static_dir = %server_config.static_dir().display(),
        seed = config.seed,
        "server starting"
    );

    let addr = server_config.http_addr().to_string();
    Server::new(server_config, store)
        .run_with_shutdown(shutdown)
        .await
        .with_context(|| format!("server on {addr} failed"))
}

//! HTTP/1.1 server.
//!
//! The accept loop spawns one task per connection and stops accepting as
//! soon as the [`ShutdownSignal`] fires. Open connections are asked to
//! finish their current request and close; the server then waits up to the
//! configured grace period for them before returning.
//!
//! Per-connection limits:
//!
//! - request headers must arrive within the read timeout (hyper closes the
//!   connection otherwise), and so must the body (408)
//! - bodies larger than the configured limit are answered with 413
//! - handlers slower than the write timeout are answered with 504
//! - keep-alive connections with no request for the idle timeout are closed

use crate::app::{App, BodyRejection};
use crate::config::ServerConfig;
use crate::shutdown::{ConnectionActivity, ConnectionTracker, ShutdownSignal};
use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use rolodex_core::ContactStore;
use rolodex_middleware::Request;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

/// Pause after a failed `accept` so a persistent error (e.g. out of file
/// descriptors) does not spin the loop.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Errors that stop the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listen address could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Address as configured.
        addr: String,
        /// Underlying socket error.
        #[source]
        source: std::io::Error,
    },

    /// Socket error outside of individual connections.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The Rolodex HTTP server.
///
/// # Example
///
/// ```rust,ignore
/// use rolodex_core::MemoryStore;
/// use rolodex_server::{Server, ServerConfig};
/// use std::sync::Arc;
///
/// let server = Server::new(ServerConfig::default(), Arc::new(MemoryStore::new()));
/// server.run().await?;
/// ```
#[derive(Debug)]
pub struct Server {
    config: ServerConfig,
    app: Arc<App>,
}

impl Server {
    /// Creates a server for `store`.
    #[must_use]
    pub fn new(config: ServerConfig, store: Arc<dyn ContactStore>) -> Self {
        let app = Arc::new(App::new(store, &config));
        Self { config, app }
    }

    /// Returns the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the application the server dispatches to.
    #[must_use]
    pub fn app(&self) -> Arc<App> {
        Arc::clone(&self.app)
    }

    /// Binds the configured address and serves until SIGINT or SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound.
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_with_shutdown(ShutdownSignal::with_os_signals())
            .await
    }

    /// Binds the configured address and serves until `shutdown` fires.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let addr = self.config.http_addr().to_string();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        self.serve(listener, shutdown).await
    }

    /// Serves connections from an already bound listener until `shutdown` fires.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener's local address cannot be read.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), ServerError> {
        let local_addr = listener.local_addr()?;
        info!(addr = %local_addr, "server listening");

        let tracker = ConnectionTracker::new();
        let settings = ConnectionSettings::from(&self.config);

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, remote)) => {
                        let token = tracker.acquire();
                        let app = Arc::clone(&self.app);
                        let shutdown = shutdown.clone();
                        tokio::spawn(async move {
                            serve_connection(stream, remote, app, settings, shutdown).await;
                            drop(token);
                        });
                    }
                    Err(e) => {
                        warn!(error = %e, "failed to accept connection");
                        tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                    }
                },
                () = shutdown.recv() => {
                    info!("shutdown requested, no longer accepting connections");
                    break;
                }
            }
        }
        drop(listener);

        let active = tracker.active_connections();
        if active > 0 {
            info!(active, "waiting for open connections");
        }

        tokio::select! {
            () = tracker.wait_for_drain() => {}
            () = tokio::time::sleep(self.config.shutdown_timeout()) => {
                warn!(
                    remaining = tracker.active_connections(),
                    "shutdown grace period elapsed, dropping open connections"
                );
            }
        }

        info!("server stopped");
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct ConnectionSettings {
    read_timeout: Duration,
    idle_timeout: Duration,
    max_body_bytes: usize,
}

impl From<&ServerConfig> for ConnectionSettings {
    fn from(config: &ServerConfig) -> Self {
        Self {
            read_timeout: config.read_timeout(),
            idle_timeout: config.idle_timeout(),
            max_body_bytes: config.max_body_bytes(),
        }
    }
}

async fn serve_connection(
    stream: TcpStream,
    remote: SocketAddr,
    app: Arc<App>,
    settings: ConnectionSettings,
    shutdown: ShutdownSignal,
) {
    debug!(remote = %remote, "connection accepted");
    let activity = ConnectionActivity::new();

    let service = {
        let activity = activity.clone();
        service_fn(move |request: hyper::Request<Incoming>| {
            let app = Arc::clone(&app);
            let guard = activity.begin();
            async move {
                let request =
                    read_request(request, settings.read_timeout, settings.max_body_bytes).await;
                let response = app.handle(request).await;
                drop(guard);
                Ok::<_, Infallible>(response)
            }
        })
    };

    let mut builder = http1::Builder::new();
    builder
        .timer(TokioTimer::new())
        .header_read_timeout(settings.read_timeout)
        .keep_alive(true);
    let conn = builder.serve_connection(TokioIo::new(stream), service);
    tokio::pin!(conn);

    let result = tokio::select! {
        result = conn.as_mut() => result,
        () = shutdown.recv() => {
            conn.as_mut().graceful_shutdown();
            conn.as_mut().await
        }
        () = activity.idle_timeout(settings.idle_timeout) => {
            debug!(remote = %remote, "closing idle connection");
            conn.as_mut().graceful_shutdown();
            conn.as_mut().await
        }
    };

    if let Err(e) = result {
        debug!(remote = %remote, error = %e, "connection closed with error");
    }
}

/// Buffers the body so the pipeline sees a complete request.
///
/// A body that is too large, too slow or malformed is replaced by an empty
/// one and the request is tagged with the status to answer.
async fn read_request(
    request: hyper::Request<Incoming>,
    read_timeout: Duration,
    max_body_bytes: usize,
) -> Request {
    let (parts, body) = request.into_parts();

    let collected = tokio::time::timeout(
        read_timeout,
        Limited::new(body, max_body_bytes).collect(),
    )
    .await;

    let (body, rejection) = match collected {
        Ok(Ok(collected)) => (collected.to_bytes(), None),
        Ok(Err(e)) if e.downcast_ref::<LengthLimitError>().is_some() => {
            (Bytes::new(), Some(StatusCode::PAYLOAD_TOO_LARGE))
        }
        Ok(Err(e)) => {
            debug!(error = %e, "failed to read request body");
            (Bytes::new(), Some(StatusCode::BAD_REQUEST))
        }
        Err(_) => (Bytes::new(), Some(StatusCode::REQUEST_TIMEOUT)),
    };

    let mut request = http::Request::from_parts(parts, Full::new(body));
    if let Some(status) = rejection {
        request.extensions_mut().insert(BodyRejection(status));
    }
    request
}

//! Graceful shutdown and connection bookkeeping.
//!
//! [`ShutdownSignal`] is triggered by SIGINT/SIGTERM (or by hand in tests) and
//! observed by the accept loop and every connection task.
//! [`ConnectionTracker`] counts live connections so the server can wait for
//! them to drain. [`ConnectionActivity`] tracks when a single keep-alive
//! connection last did any work, which drives the idle timeout.
//!
//! # Example
//!
//! ```rust,ignore
//! use rolodex_server::ShutdownSignal;
//! use std::time::Duration;
//!
//! let shutdown = ShutdownSignal::new();
//! tokio::select! {
//!     () = shutdown.recv() => tracing::info!("shutting down"),
//!     () = tokio::time::sleep(Duration::from_secs(60)) => {}
//! }
//! ```

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, Notify};

/// A cloneable, idempotent shutdown trigger.
///
/// # Example
///
/// ```
/// use rolodex_server::ShutdownSignal;
///
/// let shutdown = ShutdownSignal::new();
/// let observer = shutdown.clone();
///
/// shutdown.trigger();
/// assert!(observer.is_shutdown());
/// ```
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    triggered: Arc<AtomicBool>,
    sender: broadcast::Sender<()>,
}

impl ShutdownSignal {
    /// Creates an untriggered signal.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self {
            triggered: Arc::new(AtomicBool::new(false)),
            sender,
        }
    }

    /// Triggers shutdown. Subsequent calls do nothing.
    pub fn trigger(&self) {
        if self
            .triggered
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            // No receivers is fine.
            let _ = self.sender.send(());
        }
    }

    /// Returns `true` once shutdown has been triggered.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    /// Completes when shutdown is triggered, immediately if it already was.
    pub async fn recv(&self) {
        // Subscribe before checking the flag so a trigger in between is not lost.
        let mut receiver = self.sender.subscribe();
        if self.is_shutdown() {
            return;
        }
        let _ = receiver.recv().await;
    }

    /// Creates a signal that triggers on SIGTERM or SIGINT.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn with_os_signals() -> Self {
        let signal = Self::new();
        let trigger = signal.clone();
        tokio::spawn(async move {
            wait_for_os_signal().await;
            trigger.trigger();
        });
        signal
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
async fn wait_for_os_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => tracing::info!("received SIGTERM"),
                _ = sigint.recv() => tracing::info!("received SIGINT"),
            }
        }
        (Err(e), _) | (_, Err(e)) => {
            tracing::error!(error = %e, "failed to install signal handlers");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_os_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("received Ctrl+C"),
        Err(e) => {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    }
}

/// Counts open connections and wakes waiters when the count reaches zero.
#[derive(Debug, Clone, Default)]
pub struct ConnectionTracker {
    active: Arc<AtomicUsize>,
    drained: Arc<Notify>,
}

impl ConnectionTracker {
    /// Creates a tracker with no connections.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection. It stays counted until the token is dropped.
    #[must_use]
    pub fn acquire(&self) -> ConnectionToken {
        self.active.fetch_add(1, Ordering::SeqCst);
        ConnectionToken {
            active: Arc::clone(&self.active),
            drained: Arc::clone(&self.drained),
        }
    }

    /// Number of connections currently open.
    #[must_use]
    pub fn active_connections(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Completes once every token has been dropped.
    pub async fn wait_for_drain(&self) {
        loop {
            let notified = self.drained.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.active_connections() == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// Keeps a connection counted in its [`ConnectionTracker`].
#[derive(Debug)]
pub struct ConnectionToken {
    active: Arc<AtomicUsize>,
    drained: Arc<Notify>,
}

impl Drop for ConnectionToken {
    fn drop(&mut self) {
        if self.active.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.drained.notify_waiters();
        }
    }
}

/// Request activity on one connection.
///
/// The connection is idle while no request is in flight; the idle clock
/// restarts whenever a request finishes.
#[derive(Debug, Clone)]
pub struct ConnectionActivity {
    in_flight: Arc<AtomicUsize>,
    last_active: Arc<Mutex<Instant>>,
}

impl ConnectionActivity {
    /// Creates a tracker for a connection that was just accepted.
    #[must_use]
    pub fn new() -> Self {
        Self {
            in_flight: Arc::new(AtomicUsize::new(0)),
            last_active: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Marks a request as started. It finishes when the guard is dropped.
    #[must_use]
    pub fn begin(&self) -> ActivityGuard {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        *self.last_active.lock() = Instant::now();
        ActivityGuard {
            activity: self.clone(),
        }
    }

    /// How long the connection has been idle, or `None` while busy.
    #[must_use]
    pub fn idle_for(&self) -> Option<Duration> {
        if self.in_flight.load(Ordering::SeqCst) > 0 {
            return None;
        }
        Some(self.last_active.lock().elapsed())
    }

    /// Completes once the connection has been idle for `timeout`.
    pub async fn idle_timeout(&self, timeout: Duration) {
        loop {
            let wait = match self.idle_for() {
                Some(idle) if idle >= timeout => return,
                Some(idle) => timeout - idle,
                None => timeout,
            };
            tokio::time::sleep(wait).await;
        }
    }
}

impl Default for ConnectionActivity {
    fn default() -> Self {
        Self::new()
    }
}

/// Marks one in-flight request on a [`ConnectionActivity`].
#[derive(Debug)]
pub struct ActivityGuard {
    activity: ConnectionActivity,
}

impl Drop for ActivityGuard {
    fn drop(&mut self) {
        *self.activity.last_active.lock() = Instant::now();
        self.activity.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

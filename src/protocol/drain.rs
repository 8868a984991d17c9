//! Graceful stop bookkeeping shared by both protocol servers.
//!
//! A server's `run` holds a [`RunGuard`] for as long as it serves; `stop`
//! closes the accept side, waits for the guard to drop, and cancels the
//! force token once the deadline passes. Every accepted connection holds the
//! force token (see [`crate::net::ForceClose`]).

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::protocol::{ServerError, ServerKind};

pub struct DrainControl {
    kind: ServerKind,
    /// Cancelled when the server must stop accepting new connections.
    accept: CancellationToken,
    /// Cancelled when in-flight connections must be abandoned.
    force: CancellationToken,
    started: AtomicBool,
    stopped: watch::Sender<bool>,
}

impl DrainControl {
    pub fn new(kind: ServerKind) -> Self {
        let (stopped, _) = watch::channel(false);
        Self {
            kind,
            accept: CancellationToken::new(),
            force: CancellationToken::new(),
            started: AtomicBool::new(false),
            stopped,
        }
    }

    /// Claim the single run of this server.
    pub fn begin(&self) -> Result<RunGuard<'_>, ServerError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(ServerError::AlreadyRunning(self.kind));
        }
        Ok(RunGuard { control: self })
    }

    pub fn is_draining(&self) -> bool {
        self.accept.is_cancelled()
    }

    /// Resolves once a stop has been requested.
    pub fn stop_requested(&self) -> impl Future<Output = ()> + Send + 'static {
        let accept = self.accept.clone();
        async move { accept.cancelled().await }
    }

    /// Token cancelled once the drain deadline has passed; handed to every
    /// accepted connection.
    pub fn force_token(&self) -> CancellationToken {
        self.force.clone()
    }

    /// Resolves once the drain deadline has passed.
    pub fn force_requested(&self) -> impl Future<Output = ()> + Send + 'static {
        let force = self.force.clone();
        async move { force.cancelled().await }
    }

    pub async fn stop(&self, deadline: Duration) -> Result<(), ServerError> {
        self.accept.cancel();

        if !self.started.load(Ordering::SeqCst) {
            tracing::debug!(server = %self.kind, "Stop requested before run; nothing to drain");
            return Ok(());
        }

        let mut stopped = self.stopped.subscribe();
        let drained = tokio::time::timeout(deadline, stopped.wait_for(|done| *done))
            .await
            .is_ok();
        if drained {
            return Ok(());
        }

        tracing::warn!(
            server = %self.kind,
            deadline = ?deadline,
            "Drain deadline exceeded, forcing close"
        );
        self.force.cancel();
        let _ = stopped.wait_for(|done| *done).await;

        Err(ServerError::DrainTimeout {
            server: self.kind,
            deadline,
        })
    }
}

/// Marks a server as running; dropping it marks the server stopped.
pub struct RunGuard<'a> {
    control: &'a DrainControl,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.control.stopped.send_replace(true);
        tracing::trace!(server = %self.control.kind, "Server run finished");
    }
}

//! OS signal handling.
//!
//! # Responsibilities
//! - Register signal handlers (SIGTERM, SIGINT)
//! - Translate signals to a single shutdown trigger
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - `wait` consumes the watcher, so a trigger is delivered exactly once
//! - Later signals are logged and ignored; they never restart shutdown

use std::fmt;
use tokio::sync::mpsc;

/// The termination request that started shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    Interrupt,
    Terminate,
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownSignal::Interrupt => f.write_str("SIGINT"),
            ShutdownSignal::Terminate => f.write_str("SIGTERM"),
        }
    }
}

/// Receives termination signals and yields the first one.
pub struct SignalWatcher {
    rx: mpsc::UnboundedReceiver<ShutdownSignal>,
}

impl SignalWatcher {
    /// A watcher fed by the returned sender instead of the OS.
    pub fn channel() -> (mpsc::UnboundedSender<ShutdownSignal>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self { rx })
    }

    /// Register for SIGINT and SIGTERM.
    #[cfg(unix)]
    pub fn install() -> std::io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;
        let (tx, watcher) = Self::channel();

        tokio::spawn(async move {
            loop {
                let received = tokio::select! {
                    Some(()) = sigint.recv() => ShutdownSignal::Interrupt,
                    Some(()) = sigterm.recv() => ShutdownSignal::Terminate,
                    else => break,
                };
                if tx.send(received).is_err() {
                    break;
                }
            }
        });

        Ok(watcher)
    }

    // Best-effort implementation for non-unix systems
    #[cfg(not(unix))]
    pub fn install() -> std::io::Result<Self> {
        let (tx, watcher) = Self::channel();

        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                if tx.send(ShutdownSignal::Interrupt).is_err() {
                    break;
                }
            }
        });

        Ok(watcher)
    }

    /// Wait for the first signal. Returns `None` if the source closed
    /// without delivering one.
    pub async fn wait(mut self) -> Option<ShutdownSignal> {
        let first = self.rx.recv().await?;

        let mut later = self.rx;
        tokio::spawn(async move {
            while let Some(signal) = later.recv().await {
                tracing::warn!(signal = %signal, "Shutdown already in progress, ignoring signal");
            }
        });

        Some(first)
    }
}

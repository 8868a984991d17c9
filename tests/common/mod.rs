//! Shared utilities for lifecycle integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use auth_supervisor::config::ServiceConfig;
use auth_supervisor::protocol::{DrainControl, ProtocolServer, ServerError, ServerKind};
use auth_supervisor::storage::{AccountStore, StorageError};

/// Ordered record of lifecycle events across servers.
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, event: &str) -> usize {
        self.events().iter().filter(|e| *e == event).count()
    }

    pub fn position(&self, event: &str) -> Option<usize> {
        self.events().iter().position(|e| e == event)
    }
}

/// Protocol server without I/O that logs every lifecycle step.
pub struct RecordingServer {
    kind: ServerKind,
    log: EventLog,
    control: DrainControl,
    fail_after: Option<Duration>,
}

impl RecordingServer {
    pub fn new(kind: ServerKind, log: EventLog) -> Arc<Self> {
        Arc::new(Self {
            kind,
            log,
            control: DrainControl::new(kind),
            fail_after: None,
        })
    }

    /// A server whose `run` fails immediately, like an accept error.
    pub fn failing(kind: ServerKind, log: EventLog) -> Arc<Self> {
        Self::failing_after(kind, log, Duration::ZERO)
    }

    /// A server whose `run` fails once `delay` has elapsed.
    pub fn failing_after(kind: ServerKind, log: EventLog, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            kind,
            log,
            control: DrainControl::new(kind),
            fail_after: Some(delay),
        })
    }
}

#[async_trait]
impl ProtocolServer for RecordingServer {
    fn kind(&self) -> ServerKind {
        self.kind
    }

    async fn run(&self) -> Result<(), ServerError> {
        let _running = self.control.begin()?;
        self.log.push(format!("start {}", self.kind));

        if let Some(delay) = self.fail_after {
            tokio::time::sleep(delay).await;
            self.log.push(format!("{} failed", self.kind));
            return Err(ServerError::serve(
                self.kind,
                std::io::Error::new(std::io::ErrorKind::Other, "accept failed"),
            ));
        }

        self.control.stop_requested().await;
        self.log.push(format!("{} run returned", self.kind));
        Ok(())
    }

    async fn stop(&self, deadline: Duration) -> Result<(), ServerError> {
        self.log.push(format!("stop {}", self.kind));
        self.control.stop(deadline).await?;
        self.log.push(format!("{} stop returned", self.kind));
        Ok(())
    }
}

/// Account store replaying scripted results after an optional delay.
pub struct MockStore {
    results: Mutex<VecDeque<Result<u64, String>>>,
    delay: Duration,
    calls: AtomicUsize,
    completed: AtomicUsize,
}

impl MockStore {
    pub fn new(results: Vec<Result<u64, String>>) -> Arc<Self> {
        Self::with_delay(results, Duration::ZERO)
    }

    pub fn with_delay(results: Vec<Result<u64, String>>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            results: Mutex::new(results.into()),
            delay,
            calls: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AccountStore for MockStore {
    async fn delete_inactive_accounts(&self) -> Result<u64, StorageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        let next = self.results.lock().unwrap().pop_front().unwrap_or(Ok(0));
        self.completed.fetch_add(1, Ordering::SeqCst);
        next.map_err(|reason| StorageError::Database(sqlx::Error::Protocol(reason)))
    }
}

/// Default config with both listeners on ephemeral loopback ports.
pub fn loopback_config() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.rpc.host = "127.0.0.1".into();
    config.rpc.port = 0;
    config.http.host = "127.0.0.1".into();
    config.http.port = 0;
    config.shutdown.http_drain_secs = 2;
    config.shutdown.rpc_drain_secs = 2;
    config
}

//! Shutdown coordination for the service.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::config::ShutdownConfig;
use crate::lifecycle::{Application, SupervisorState};
use crate::observability::metrics;
use crate::protocol::{ProtocolServer, ServerError};

/// Runs the stop sequence exactly once.
///
/// Order: cancel the process token (readiness fails, maintenance stops
/// scheduling), stop HTTP within its drain deadline, then stop gRPC. A stop
/// error is logged and the sequence continues.
pub struct ShutdownCoordinator {
    http: Arc<dyn ProtocolServer>,
    rpc: Arc<dyn ProtocolServer>,
    token: CancellationToken,
    deadlines: ShutdownConfig,
    started: AtomicBool,
}

impl ShutdownCoordinator {
    pub fn new(state: &SupervisorState, app: &Application) -> Self {
        Self {
            http: app.http.clone(),
            rpc: app.rpc.clone(),
            token: state.shutdown_token().clone(),
            deadlines: state.config().shutdown.clone(),
            started: AtomicBool::new(false),
        }
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Execute the stop sequence. Returns `false` if it had already run.
    pub async fn shutdown(&self) -> bool {
        if self.started.swap(true, Ordering::SeqCst) {
            tracing::debug!("Shutdown already executed");
            return false;
        }

        self.token.cancel();

        stop_server(self.http.as_ref(), self.deadlines.http_drain()).await;
        stop_server(self.rpc.as_ref(), self.deadlines.rpc_drain()).await;

        true
    }
}

async fn stop_server(server: &dyn ProtocolServer, deadline: Duration) {
    let kind = server.kind();
    match server.stop(deadline).await {
        Ok(()) => {
            tracing::info!(server = %kind, "Server stop returned");
            metrics::record_server_stop(kind.as_str(), "clean");
        }
        Err(e @ ServerError::DrainTimeout { .. }) => {
            tracing::warn!(server = %kind, error = %e, "Server stop exceeded its deadline");
            metrics::record_server_stop(kind.as_str(), "forced");
        }
        Err(e) => {
            tracing::error!(server = %kind, error = %e, "Server failed to stop cleanly");
            metrics::record_server_stop(kind.as_str(), "error");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceConfig;
    use crate::protocol::ServerKind;
    use crate::storage::{AccountStore, StorageError};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct NoopStore;

    #[async_trait]
    impl AccountStore for NoopStore {
        async fn delete_inactive_accounts(&self) -> Result<u64, StorageError> {
            Ok(0)
        }
    }

    /// Records stop calls into a shared log; optionally fails them.
    struct StubServer {
        kind: ServerKind,
        log: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    #[async_trait]
    impl ProtocolServer for StubServer {
        fn kind(&self) -> ServerKind {
            self.kind
        }

        async fn run(&self) -> Result<(), ServerError> {
            Ok(())
        }

        async fn stop(&self, deadline: Duration) -> Result<(), ServerError> {
            self.log.lock().unwrap().push(format!("stop {}", self.kind));
            if self.fail {
                return Err(ServerError::DrainTimeout {
                    server: self.kind,
                    deadline,
                });
            }
            Ok(())
        }
    }

    fn coordinator(fail_http: bool) -> (ShutdownCoordinator, SupervisorState, Arc<Mutex<Vec<String>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let server = |kind, fail| -> Arc<dyn ProtocolServer> {
            Arc::new(StubServer {
                kind,
                log: log.clone(),
                fail,
            })
        };
        let app = Application::from_parts(
            server(ServerKind::Rpc, false),
            server(ServerKind::Http, fail_http),
            Arc::new(NoopStore),
            Duration::from_secs(3600),
        );
        let state = SupervisorState::new(ServiceConfig::default());
        (ShutdownCoordinator::new(&state, &app), state, log)
    }

    #[tokio::test]
    async fn stops_http_before_rpc() {
        let (coordinator, state, log) = coordinator(false);

        assert!(coordinator.shutdown().await);
        assert!(state.is_shutting_down());
        assert_eq!(*log.lock().unwrap(), vec!["stop http", "stop grpc"]);
    }

    #[tokio::test]
    async fn runs_at_most_once() {
        let (coordinator, _state, log) = coordinator(false);
        let coordinator = Arc::new(coordinator);
        assert!(!coordinator.is_started());

        let a = tokio::spawn({
            let c = coordinator.clone();
            async move { c.shutdown().await }
        });
        let b = tokio::spawn({
            let c = coordinator.clone();
            async move { c.shutdown().await }
        });
        let executed = [a.await.unwrap(), b.await.unwrap()];

        assert_eq!(executed.iter().filter(|ran| **ran).count(), 1);
        assert!(coordinator.is_started());
        assert!(!coordinator.shutdown().await);
        assert_eq!(log.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn http_stop_failure_still_stops_rpc() {
        let (coordinator, _state, log) = coordinator(true);

        assert!(coordinator.shutdown().await);
        assert_eq!(*log.lock().unwrap(), vec!["stop http", "stop grpc"]);
    }
}

//! Composition root: launches every subsystem and owns the exit sequence.

use std::sync::Arc;
use thiserror::Error;
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tokio::time::{self, Instant};
use tracing::Instrument;

use crate::config::ServiceConfig;
use crate::lifecycle::{Application, ShutdownCoordinator, SignalWatcher, StartupError, SupervisorState};
use crate::maintenance::{MaintenanceRunner, MaintenanceSettings};
use crate::observability::metrics;
use crate::protocol::{ServerError, ServerKind};

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("failed to install signal handlers: {0}")]
    Signals(#[source] std::io::Error),

    #[error(transparent)]
    Startup(#[from] StartupError),

    #[error(transparent)]
    Server(#[from] ServerError),

    #[error("{0} server exited before shutdown was requested")]
    ServerExited(ServerKind),

    #[error("server task panicked: {0}")]
    Join(#[from] JoinError),
}

type ServerExit = (ServerKind, Result<(), ServerError>);

pub struct Supervisor {
    state: SupervisorState,
}

impl Supervisor {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            state: SupervisorState::new(config),
        }
    }

    pub fn state(&self) -> &SupervisorState {
        &self.state
    }

    /// Run the application until a shutdown signal arrives and every
    /// subsystem has stopped.
    ///
    /// A protocol server that exits before shutdown is fatal: the remaining
    /// subsystems are stopped in the usual order and the exit is returned as
    /// an error. All other failures are logged where they happen.
    pub async fn run(self, app: Application, signals: SignalWatcher) -> Result<(), SupervisorError> {
        let config = self.state.config();
        tracing::info!(
            env = %config.env,
            rpc_port = config.rpc.port,
            http_port = config.http.port,
            token_ttl_secs = app.token_ttl.as_secs(),
            maintenance_enabled = config.maintenance.enabled,
            maintenance_interval_secs = config.maintenance.interval_secs,
            "Starting application"
        );

        let mut servers: JoinSet<ServerExit> = JoinSet::new();
        for server in [app.http.clone(), app.rpc.clone()] {
            let kind = server.kind();
            let span = tracing::info_span!("server", kind = %kind);
            servers.spawn(async move { (kind, server.run().await) }.instrument(span));
        }

        let maintenance = self.spawn_maintenance(&app);
        let coordinator = ShutdownCoordinator::new(&self.state, &app);

        let signal = tokio::select! {
            signal = signals.wait() => signal,
            Some(exit) = servers.join_next() => {
                let err = premature_exit(exit);
                tracing::error!(error = %err, "Protocol server exited unexpectedly, stopping application");
                self.stop_all(&coordinator, servers, maintenance).await;
                return Err(err);
            }
        };

        match signal {
            Some(signal) => tracing::info!(signal = %signal, "Stopping application"),
            None => tracing::warn!("Signal source closed, stopping application"),
        }

        self.stop_all(&coordinator, servers, maintenance).await;
        tracing::info!("Application stopped");
        Ok(())
    }

    /// Ordered exit shared by the signal and fatal paths: stop both servers,
    /// join their tasks, then give maintenance its grace.
    async fn stop_all(
        &self,
        coordinator: &ShutdownCoordinator,
        mut servers: JoinSet<ServerExit>,
        maintenance: Option<JoinHandle<()>>,
    ) {
        let started = Instant::now();
        coordinator
            .shutdown()
            .instrument(tracing::info_span!("shutdown"))
            .await;

        while let Some(exit) = servers.join_next().await {
            match exit {
                Ok((kind, Ok(()))) => tracing::info!(server = %kind, "Server stopped"),
                Ok((kind, Err(e))) => {
                    tracing::error!(server = %kind, error = %e, "Server failed during shutdown")
                }
                Err(e) => tracing::error!(error = %e, "Server task panicked"),
            }
        }

        if let Some(handle) = maintenance {
            self.join_maintenance(handle).await;
        }

        metrics::record_shutdown(started.elapsed());
    }

    fn spawn_maintenance(&self, app: &Application) -> Option<JoinHandle<()>> {
        let config = &self.state.config().maintenance;
        if !config.enabled {
            tracing::info!("Maintenance job disabled");
            return None;
        }

        let runner = Arc::new(MaintenanceRunner::new(
            app.storage.clone(),
            MaintenanceSettings::from(config),
            self.state.shutdown_token().child_token(),
        ));
        let span = tracing::info_span!("maintenance");
        Some(tokio::spawn(async move { runner.run().await }.instrument(span)))
    }

    /// Give an in-flight cleanup cycle the configured grace to finish.
    async fn join_maintenance(&self, mut handle: JoinHandle<()>) {
        let grace = self.state.config().shutdown.maintenance_grace();
        match time::timeout(grace, &mut handle).await {
            Ok(Ok(())) => tracing::debug!("Maintenance loop joined"),
            Ok(Err(e)) => tracing::error!(error = %e, "Maintenance task failed"),
            Err(_) => {
                tracing::warn!(
                    grace_secs = grace.as_secs(),
                    "Maintenance cycle still running after grace period, aborting"
                );
                handle.abort();
            }
        }
    }
}

fn premature_exit(exit: Result<ServerExit, JoinError>) -> SupervisorError {
    match exit {
        Ok((_, Err(e))) => SupervisorError::Server(e),
        Ok((kind, Ok(()))) => SupervisorError::ServerExited(kind),
        Err(e) => SupervisorError::Join(e),
    }
}

/// Install signal handlers, build the application from `config`, and run it.
pub async fn run(config: ServiceConfig) -> Result<(), SupervisorError> {
    let signals = SignalWatcher::install().map_err(SupervisorError::Signals)?;
    let supervisor = Supervisor::new(config);
    let app = Application::new(supervisor.state()).await?;
    supervisor.run(app, signals).await
}

//! gRPC server setup.
//!
//! # Responsibilities
//! - Serve the gRPC health service for the auth API on a pre-bound listener
//! - Report SERVING while running and NOT_SERVING once a stop begins
//! - Graceful stop: close the accept side, let open streams finish
//! - Past the drain deadline, abort every open connection

use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::net::TcpStream;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_stream::StreamExt;
use tonic::transport::server::{Connected, TcpConnectInfo};
use tonic::transport::Server;
use tonic_health::ServingStatus;

use crate::lifecycle::SupervisorState;
use crate::net::{self, ForceClose, ListenerError};
use crate::protocol::{DrainControl, ProtocolServer, ServerError, ServerKind};

/// Fully qualified name the auth service is registered under.
pub const AUTH_SERVICE: &str = "auth.Auth";

/// Internal-facing gRPC front-end.
pub struct RpcServer {
    listener: Mutex<Option<TcpListener>>,
    local_addr: SocketAddr,
    request_timeout: Duration,
    control: DrainControl,
}

impl RpcServer {
    /// Bind the configured gRPC port.
    pub async fn bind(state: &SupervisorState) -> Result<Self, ListenerError> {
        let config = &state.config().rpc;
        let listener = net::bind(ServerKind::Rpc, config).await?;
        Self::from_listener(listener, config.request_timeout()).map_err(|source| {
            ListenerError::Bind {
                server: ServerKind::Rpc,
                address: config.bind_address(),
                source,
            }
        })
    }

    pub fn from_listener(listener: TcpListener, request_timeout: Duration) -> std::io::Result<Self> {
        Ok(Self {
            local_addr: listener.local_addr()?,
            listener: Mutex::new(Some(listener)),
            request_timeout,
            control: DrainControl::new(ServerKind::Rpc),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

impl Connected for ForceClose<TcpStream> {
    type ConnectInfo = TcpConnectInfo;

    fn connect_info(&self) -> Self::ConnectInfo {
        self.get_ref().connect_info()
    }
}

#[async_trait]
impl ProtocolServer for RpcServer {
    fn kind(&self) -> ServerKind {
        ServerKind::Rpc
    }

    async fn run(&self) -> Result<(), ServerError> {
        let _running = self.control.begin()?;
        let listener = self
            .listener
            .lock()
            .ok()
            .and_then(|mut slot| slot.take())
            .ok_or(ServerError::AlreadyRunning(ServerKind::Rpc))?;

        let (reporter, health_service) = tonic_health::server::health_reporter();
        reporter
            .set_service_status(AUTH_SERVICE, ServingStatus::Serving)
            .await;

        tracing::info!(address = %self.local_addr, service = AUTH_SERVICE, "gRPC server starting");

        let stop_requested = self.control.stop_requested();
        let shutdown = async move {
            stop_requested.await;
            reporter
                .set_service_status(AUTH_SERVICE, ServingStatus::NotServing)
                .await;
        };

        let force = self.control.force_token();
        let incoming = TcpListenerStream::new(listener)
            .map(move |accepted| accepted.map(|stream| ForceClose::new(stream, &force)));

        let serve = Server::builder()
            .timeout(self.request_timeout)
            .add_service(health_service)
            .serve_with_incoming_shutdown(incoming, shutdown);

        let result = tokio::select! {
            served = serve => served.map_err(|e| ServerError::serve(ServerKind::Rpc, e)),
            _ = self.control.force_requested() => {
                tracing::warn!("gRPC streams force-closed");
                Ok(())
            }
        };

        if result.is_ok() {
            tracing::info!("gRPC server stopped");
        }
        result
    }

    /// Graceful stop. Open streams get up to `deadline` to complete.
    async fn stop(&self, deadline: Duration) -> Result<(), ServerError> {
        tracing::info!(deadline = ?deadline, "Stopping gRPC server");
        self.control.stop(deadline).await
    }
}

//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with health handlers
//! - Wire up middleware (tracing, timeout, request ID)
//! - Serve on a pre-bound listener until stopped
//! - Drain in-flight requests on stop, force-close past the deadline

use async_trait::async_trait;
use axum::{routing::get, Router};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::http::health::{self, HealthState};
use crate::lifecycle::SupervisorState;
use crate::net::{self, ForceClosingListener, ListenerError};
use crate::protocol::{DrainControl, ProtocolServer, ServerError, ServerKind};

/// Public-facing HTTP front-end.
pub struct HttpServer {
    listener: Mutex<Option<TcpListener>>,
    local_addr: SocketAddr,
    router: Router,
    control: DrainControl,
}

impl HttpServer {
    /// Bind the configured HTTP port.
    pub async fn bind(state: &SupervisorState) -> Result<Self, ListenerError> {
        let listener = net::bind(ServerKind::Http, &state.config().http).await?;
        Self::from_listener(listener, state).map_err(|source| ListenerError::Bind {
            server: ServerKind::Http,
            address: state.config().http.bind_address(),
            source,
        })
    }

    /// Wrap an already bound listener.
    pub fn from_listener(listener: TcpListener, state: &SupervisorState) -> std::io::Result<Self> {
        let local_addr = listener.local_addr()?;
        let health = HealthState {
            env: state.config().env,
            shutdown: state.shutdown_token().clone(),
        };
        let router = Self::build_router(state.config().http.request_timeout(), health);

        Ok(Self {
            listener: Mutex::new(Some(listener)),
            local_addr,
            router,
            control: DrainControl::new(ServerKind::Http),
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn build_router(request_timeout: Duration, health: HealthState) -> Router {
        Router::new()
            .route("/health", get(health::health))
            .route("/health/live", get(health::liveness))
            .route("/health/ready", get(health::readiness))
            .with_state(health)
            .layer(TimeoutLayer::new(request_timeout))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

#[async_trait]
impl ProtocolServer for HttpServer {
    fn kind(&self) -> ServerKind {
        ServerKind::Http
    }

    async fn run(&self) -> Result<(), ServerError> {
        let _running = self.control.begin()?;
        let listener = self
            .listener
            .lock()
            .ok()
            .and_then(|mut slot| slot.take())
            .ok_or(ServerError::AlreadyRunning(ServerKind::Http))?;

        tracing::info!(address = %self.local_addr, "HTTP server starting");

        let listener = ForceClosingListener::new(listener, self.control.force_token());
        let serve = axum::serve(listener, self.router.clone())
            .with_graceful_shutdown(self.control.stop_requested())
            .into_future();

        let result = tokio::select! {
            served = serve => served.map_err(|e| ServerError::serve(ServerKind::Http, e)),
            _ = self.control.force_requested() => {
                tracing::warn!("HTTP connections force-closed");
                Ok(())
            }
        };

        if result.is_ok() {
            tracing::info!("HTTP server stopped");
        }
        result
    }

    async fn stop(&self, deadline: Duration) -> Result<(), ServerError> {
        tracing::info!(deadline = ?deadline, "Stopping HTTP server");
        self.control.stop(deadline).await
    }
}

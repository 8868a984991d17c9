//! Startup orchestration.
//!
//! # Responsibilities
//! - Create the storage collaborator
//! - Bind both listeners before any task is spawned
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - gRPC binds first, so a port clash aborts before HTTP binds
//! - Listeners are bound here but serve only once the supervisor runs them

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::http::HttpServer;
use crate::lifecycle::SupervisorState;
use crate::net::ListenerError;
use crate::protocol::ProtocolServer;
use crate::rpc::RpcServer;
use crate::storage::{AccountStore, PgStore, StorageError};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("failed to initialise storage: {0}")]
    Storage(#[from] StorageError),
}

/// The service's protocol servers and storage, owned by the supervisor.
pub struct Application {
    pub rpc: Arc<dyn ProtocolServer>,
    pub http: Arc<dyn ProtocolServer>,
    pub storage: Arc<dyn AccountStore>,
    /// Lifetime of issued tokens, read by the auth handlers.
    pub token_ttl: Duration,
}

impl Application {
    /// Build the application from configuration: PostgreSQL storage, then
    /// the gRPC and HTTP listeners.
    pub async fn new(state: &SupervisorState) -> Result<Self, StartupError> {
        let storage = PgStore::connect_lazy(&state.config().storage_url)?;
        Self::with_storage(state, Arc::new(storage)).await
    }

    /// Build the application around an existing store.
    pub async fn with_storage(
        state: &SupervisorState,
        storage: Arc<dyn AccountStore>,
    ) -> Result<Self, StartupError> {
        let rpc = RpcServer::bind(state).await?;
        let http = HttpServer::bind(state).await?;

        Ok(Self::from_parts(
            Arc::new(rpc),
            Arc::new(http),
            storage,
            state.config().token_ttl(),
        ))
    }

    pub fn from_parts(
        rpc: Arc<dyn ProtocolServer>,
        http: Arc<dyn ProtocolServer>,
        storage: Arc<dyn AccountStore>,
        token_ttl: Duration,
    ) -> Self {
        Self {
            rpc,
            http,
            storage,
            token_ttl,
        }
    }
}

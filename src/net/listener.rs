//! TCP listener binding.
//!
//! # Responsibilities
//! - Resolve and bind the configured address for each front-end
//! - Surface bind failures as fatal, typed errors naming the server
//!
//! # Design Decisions
//! - Binding happens before any task is spawned, so a port clash aborts
//!   startup before other subsystems do work
//! - No retry: a listener that cannot bind indicates misconfiguration

use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::ListenerConfig;
use crate::protocol::ServerKind;

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Failed to bind to address.
    #[error("{server} listener failed to bind {address}: {source}")]
    Bind {
        server: ServerKind,
        address: String,
        #[source]
        source: std::io::Error,
    },
}

impl ListenerError {
    pub fn server(&self) -> ServerKind {
        match self {
            ListenerError::Bind { server, .. } => *server,
        }
    }
}

/// Bind the listener for `server` as configured.
pub async fn bind(server: ServerKind, config: &ListenerConfig) -> Result<TcpListener, ListenerError> {
    let address = config.bind_address();
    let bind_error = |source| ListenerError::Bind {
        server,
        address: address.clone(),
        source,
    };

    let listener = TcpListener::bind(&address).await.map_err(bind_error)?;
    let local_addr: SocketAddr = listener.local_addr().map_err(bind_error)?;

    tracing::info!(
        server = %server,
        address = %local_addr,
        "Listener bound"
    );

    Ok(listener)
}

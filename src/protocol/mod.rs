//! Protocol server abstraction.
//!
//! # Data Flow
//! ```text
//! Supervisor
//!     → spawn server.run()        (blocks until stopped)
//!     → coordinator: server.stop(deadline)
//!         → stop accepting (drain.rs)
//!         → wait for in-flight work up to deadline
//!         → force-close past the deadline
//!     → run() returns Ok
//! ```
//!
//! # Design Decisions
//! - HTTP (axum) and gRPC (tonic) share one `{run, stop}` contract
//! - `stop` returns only after `run` has returned
//! - A drain that overruns its deadline is an error for `stop`, never for `run`

pub mod drain;

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

pub use drain::DrainControl;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The two network front-ends of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerKind {
    Rpc,
    Http,
}

impl ServerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServerKind::Rpc => "grpc",
            ServerKind::Http => "http",
        }
    }
}

impl fmt::Display for ServerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{0} server is already running or has already run")]
    AlreadyRunning(ServerKind),

    #[error("{server} server failed while serving: {source}")]
    Serve {
        server: ServerKind,
        #[source]
        source: BoxError,
    },

    #[error("{server} server did not drain within {deadline:?}; remaining connections were closed")]
    DrainTimeout { server: ServerKind, deadline: Duration },
}

impl ServerError {
    pub fn serve(server: ServerKind, source: impl Into<BoxError>) -> Self {
        ServerError::Serve {
            server,
            source: source.into(),
        }
    }
}

/// A network listener that runs until stopped.
#[async_trait]
pub trait ProtocolServer: Send + Sync {
    fn kind(&self) -> ServerKind;

    /// Serve connections until `stop` is called or serving fails.
    async fn run(&self) -> Result<(), ServerError>;

    /// Stop accepting, drain in-flight work for up to `deadline`, then
    /// force-close. Returns after `run` has returned.
    async fn stop(&self, deadline: Duration) -> Result<(), ServerError>;
}

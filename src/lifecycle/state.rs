//! Process-wide state handed to every subsystem at construction.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::config::ServiceConfig;

/// Immutable configuration plus the process shutdown token.
///
/// Built once by the supervisor and passed by reference into each
/// subsystem constructor; nothing reads configuration from a global.
#[derive(Debug, Clone)]
pub struct SupervisorState {
    config: Arc<ServiceConfig>,
    shutdown: CancellationToken,
}

impl SupervisorState {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config: Arc::new(config),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Cancelled when the shutdown sequence begins.
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

//! Health endpoints served on the HTTP front-end.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::config::Environment;

/// State injected into the health handlers.
#[derive(Clone)]
pub struct HealthState {
    pub env: Environment,
    /// Process-wide shutdown token; readiness fails once it is cancelled.
    pub shutdown: CancellationToken,
}

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub env: &'static str,
    pub version: &'static str,
}

impl HealthState {
    fn report(&self) -> HealthReport {
        HealthReport {
            status: if self.shutdown.is_cancelled() { "draining" } else { "ok" },
            env: self.env.as_str(),
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

pub async fn health(State(state): State<HealthState>) -> Json<HealthReport> {
    Json(state.report())
}

pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

pub async fn readiness(State(state): State<HealthState>) -> impl IntoResponse {
    let status = if state.shutdown.is_cancelled() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };
    (status, Json(state.report()))
}

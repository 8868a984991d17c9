//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, ports valid)
//! - Detect conflicting listeners
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::{ListenerConfig, ServiceConfig};

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{listener} port must be non-zero")]
    ZeroPort { listener: &'static str },

    #[error("rpc and http listeners both use port {0}")]
    PortConflict(u16),

    #[error("{listener} host must not be empty")]
    EmptyHost { listener: &'static str },

    #[error("storage_url must not be empty")]
    EmptyStorageUrl,

    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },

    #[error("metrics_address {0:?} is not a valid socket address")]
    InvalidMetricsAddress(String),
}

/// Check a parsed configuration, collecting every violation.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_listener("rpc", &config.rpc, &mut errors);
    check_listener("http", &config.http, &mut errors);

    if config.rpc.port != 0 && config.rpc.port == config.http.port {
        errors.push(ValidationError::PortConflict(config.rpc.port));
    }

    if config.storage_url.trim().is_empty() {
        errors.push(ValidationError::EmptyStorageUrl);
    }

    let positive = [
        ("token_ttl_secs", config.token_ttl_secs),
        ("maintenance.interval_secs", config.maintenance.interval_secs),
        ("maintenance.cycle_timeout_secs", config.maintenance.cycle_timeout_secs),
        ("shutdown.http_drain_secs", config.shutdown.http_drain_secs),
        ("shutdown.rpc_drain_secs", config.shutdown.rpc_drain_secs),
    ];
    for (field, value) in positive {
        if value == 0 {
            errors.push(ValidationError::NotPositive { field });
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_listener(name: &'static str, listener: &ListenerConfig, errors: &mut Vec<ValidationError>) {
    if listener.port == 0 {
        errors.push(ValidationError::ZeroPort { listener: name });
    }
    if listener.host.trim().is_empty() {
        errors.push(ValidationError::EmptyHost { listener: name });
    }
    if listener.request_timeout_secs == 0 {
        errors.push(ValidationError::NotPositive {
            field: if name == "rpc" { "rpc.request_timeout_secs" } else { "http.request_timeout_secs" },
        });
    }
}

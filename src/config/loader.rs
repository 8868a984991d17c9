//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ServiceConfig, ConfigError> {
    let config: ServiceConfig = toml::from_str(content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::Environment;

    #[test]
    fn parses_full_config() {
        let config = parse_config(
            r#"
            env = "dev"
            storage_url = "postgres://auth:auth@db:5432/auth"
            token_ttl_secs = 900

            [rpc]
            host = "127.0.0.1"
            port = 50051

            [http]
            port = 8080

            [maintenance]
            interval_secs = 3600

            [shutdown]
            http_drain_secs = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.env, Environment::Dev);
        assert_eq!(config.rpc.bind_address(), "127.0.0.1:50051");
        assert_eq!(config.http.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.maintenance.interval_secs, 3600);
        assert_eq!(config.shutdown.http_drain_secs, 5);
        assert_eq!(config.shutdown.rpc_drain_secs, 10);
    }

    #[test]
    fn validation_failure_lists_all_problems() {
        let err = parse_config(
            r#"
            storage_url = ""
            token_ttl_secs = 0
            "#,
        )
        .unwrap_err();

        match &err {
            ConfigError::Validation(errors) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
        let message = err.to_string();
        assert!(message.contains("storage_url must not be empty"));
        assert!(message.contains("token_ttl_secs must be greater than zero"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/auth-supervisor.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}

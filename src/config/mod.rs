//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → shared via Arc<ServiceConfig> in SupervisorState
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Any load failure is fatal before a subsystem starts

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    Environment, ListenerConfig, LogFormat, LogProfile, MaintenanceConfig, ObservabilityConfig,
    ServiceConfig, ShutdownConfig,
};
pub use validation::{validate_config, ValidationError};

//! Structured logging.
//!
//! # Responsibilities
//! - Initialize logging subsystem from the environment's profile
//! - Allow `RUST_LOG` to override the profile level at runtime
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for dev/prod, pretty format for local
//! - Profile is resolved once in main; subsystems receive their own span

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, LogProfile};

/// Install the global subscriber described by `profile`.
pub fn init_logging(profile: LogProfile) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(profile.level.as_str().to_ascii_lowercase()));

    match profile.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json())
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }

    tracing::debug!(format = ?profile.format, level = %profile.level, "Logging initialized");
}

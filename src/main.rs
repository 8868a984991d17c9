//! Authentication service supervisor.
//!
//! Starts the gRPC and HTTP front-ends of the auth service together with the
//! inactive-account cleanup job, and drives an ordered graceful shutdown on
//! SIGINT/SIGTERM.
//!
//! # Architecture Overview
//!
//! ```text
//!   config.toml ──▶ ServiceConfig ──▶ logging profile ──▶ SupervisorState
//!                                                              │
//!          ┌───────────────────────┬───────────────────────────┤
//!          ▼                       ▼                           ▼
//!   ┌──────────────┐        ┌──────────────┐           ┌──────────────┐
//!   │ HTTP (axum)  │        │ gRPC (tonic) │           │ maintenance  │
//!   └──────▲───────┘        └──────▲───────┘           └──────┬───────┘
//!          │ 1. stop (drain)       │ 2. stop (drain)          │ every 24h
//!          │                       │                          ▼
//!   ┌──────┴───────────────────────┴──────┐           ┌──────────────┐
//!   │ SignalWatcher → ShutdownCoordinator │           │ AccountStore │
//!   └──────────────────▲──────────────────┘           │ (PostgreSQL) │
//!                      │                              └──────────────┘
//!               SIGINT / SIGTERM
//! ```

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

use auth_supervisor::config::load_config;
use auth_supervisor::lifecycle;
use auth_supervisor::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "auth-supervisor")]
#[command(about = "Runs the auth service's gRPC and HTTP front-ends", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, env = "CONFIG_PATH")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Configuration errors are fatal before anything starts
    let config = load_config(&cli.config)?;

    logging::init_logging(config.env.log_profile());

    tracing::info!(
        env = %config.env,
        config_path = %cli.config.display(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    if let Err(e) = lifecycle::run(config).await {
        tracing::error!(error = %e, "Fatal error");
        return Err(e.into());
    }

    Ok(())
}

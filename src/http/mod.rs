//! HTTP protocol front-end.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → health.rs (liveness / readiness / status)
//!     → Send to client
//! ```

pub mod health;
pub mod server;

pub use health::HealthState;
pub use server::HttpServer;

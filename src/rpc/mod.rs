//! gRPC protocol front-end.
//!
//! # Data Flow
//! ```text
//! TCP connection (HTTP/2)
//!     → server.rs (tonic transport)
//!     → grpc.health.v1.Health (auth.Auth status)
//! ```
//!
//! # Design Decisions
//! - Auth RPC handlers are registered by the auth API crate; this front-end
//!   owns only the listener lifecycle and health reporting
//! - Stop is graceful: NOT_SERVING is published before streams drain

pub mod server;

pub use server::{RpcServer, AUTH_SERVICE};

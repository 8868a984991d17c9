//! Network foundation.
//!
//! # Data Flow
//! ```text
//! ListenerConfig (host, port)
//!     → listener.rs (bind, fail fast on clash)
//!     → TcpListener handed to the HTTP or gRPC server
//!     → connection.rs (each accepted stream wrapped in ForceClose)
//! ```

pub mod connection;
pub mod listener;

pub use connection::{ForceClose, ForceClosingListener};
pub use listener::{bind, ListenerError};

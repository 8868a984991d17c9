//! Authentication service supervisor library.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod maintenance;
pub mod net;
pub mod observability;
pub mod protocol;
pub mod rpc;
pub mod storage;

pub use config::schema::ServiceConfig;
pub use lifecycle::{Application, Supervisor, SupervisorError};
pub use protocol::ProtocolServer;

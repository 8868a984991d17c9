//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Create storage → Bind gRPC → Bind HTTP
//!
//! Run (supervisor.rs):
//!     Spawn HTTP, gRPC, maintenance → wait for signal
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → single shutdown trigger
//!
//! Shutdown (shutdown.rs):
//!     Cancel token → stop HTTP (drain) → stop gRPC (drain)
//!     → join servers → join maintenance (grace) → exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then storage, then listeners
//! - Ordered shutdown: public HTTP surface first, internal gRPC second
//! - Every stop has a deadline: forced close after it passes

pub mod shutdown;
pub mod signals;
pub mod startup;
pub mod state;
pub mod supervisor;

pub use shutdown::ShutdownCoordinator;
pub use signals::{ShutdownSignal, SignalWatcher};
pub use startup::{Application, StartupError};
pub use state::SupervisorState;
pub use supervisor::{run, Supervisor, SupervisorError};

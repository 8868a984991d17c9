//! Background maintenance subsystem.
//!
//! # Data Flow
//! ```text
//! Idle → Scheduled ──tick──▶ Running → Idle → Scheduled ...
//!          │                                      │
//!          └──────── stop / shutdown token ───────┴──▶ Stopped
//!
//! Running: AccountStore::delete_inactive_accounts (bounded by cycle timeout)
//!     → MaintenanceOutcome → log + metrics
//! ```

pub mod runner;

pub use runner::{MaintenanceOutcome, MaintenanceRunner, MaintenanceSettings, RunnerState};

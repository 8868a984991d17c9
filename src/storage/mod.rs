//! Account storage collaborator.
//!
//! # Responsibilities
//! - Expose the single operation the lifecycle core needs from storage
//! - Provide the PostgreSQL-backed implementation used in deployment
//!
//! # Design Decisions
//! - Trait object (`Arc<dyn AccountStore>`) shared by the maintenance job and
//!   the protocol handlers; the store is safe for concurrent use by contract
//! - The pool connects lazily so startup never blocks on the database

pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Remove accounts that never completed confirmation. Returns the number
    /// of accounts deleted.
    async fn delete_inactive_accounts(&self) -> Result<u64, StorageError>;
}

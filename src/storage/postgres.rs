//! PostgreSQL account store.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use crate::storage::{AccountStore, StorageError};

const DELETE_INACTIVE_ACCOUNTS: &str =
    "DELETE FROM users WHERE is_confirmed = FALSE AND created_at < NOW() - INTERVAL '24 hours'";

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a pool for `url` without opening a connection yet.
    pub fn connect_lazy(url: &str) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .connect_lazy(url)?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl AccountStore for PgStore {
    async fn delete_inactive_accounts(&self) -> Result<u64, StorageError> {
        let result = sqlx::query(DELETE_INACTIVE_ACCOUNTS)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

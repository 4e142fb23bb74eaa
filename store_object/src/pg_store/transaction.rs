//! Transaction support for PgStore
//!
//! A [`PgTransaction`] is a session over an open `sqlx::Transaction`; every
//! call made through it commits or rolls back together.

use super::session::PgTransaction;
use crate::errors::{StoreError, StoreResult};
use crate::traits::UnitOfWork;
use async_trait::async_trait;

#[async_trait]
impl UnitOfWork for PgTransaction {
    async fn commit(self) -> StoreResult<()> {
        self.conn.commit().await.map_err(StoreError::Connection)?;
        tracing::debug!("[TRANSACTION] committed");
        Ok(())
    }

    async fn rollback(self) -> StoreResult<()> {
        self.conn.rollback().await.map_err(StoreError::Connection)?;
        tracing::debug!("[TRANSACTION] rolled back");
        Ok(())
    }
}

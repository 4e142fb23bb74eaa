//! Store and transaction traits
//!
//! A [`Store`] hands out autocommit sessions and transactions. A transaction
//! is a [`Session`] whose writes become visible together on commit.
//!
//! # Example
//! ```ignore
//! let mut tx = store.begin().await?;
//! tx.soft_delete::<Post>(post_id, now).await?;
//! tx.soft_delete_where::<Reply>(children_of(post_id), now).await?;
//! tx.commit().await?;
//! ```

use super::core::Session;
use crate::errors::{StoreError, StoreResult};
use async_trait::async_trait;
use futures::future::BoxFuture;

#[async_trait]
pub trait UnitOfWork: Session + Sized {
    /// Commit the transaction
    async fn commit(self) -> StoreResult<()>;

    /// Rollback the transaction
    async fn rollback(self) -> StoreResult<()>;
}

#[async_trait]
pub trait Store: Send + Sync {
    type Session: Session;
    type Transaction: UnitOfWork;

    /// Autocommit session: each call is its own unit of work
    async fn session(&self) -> StoreResult<Self::Session>;

    /// Begin a new transaction
    async fn begin(&self) -> StoreResult<Self::Transaction>;
}

/// Run `f` inside a transaction: commit when it returns `Ok`, roll back when
/// it returns `Err`. The closure receives the transaction by mutable reference
/// and must not capture borrowed data.
///
/// ```ignore
/// let removed = run_in_transaction(&store, move |tx| {
///     Box::pin(async move { tx.delete_where::<Reply>(query).await.map_err(Into::into) })
/// })
/// .await?;
/// ```
pub async fn run_in_transaction<S, F, R, E>(store: &S, f: F) -> Result<R, E>
where
    S: Store + ?Sized,
    F: for<'t> FnOnce(&'t mut S::Transaction) -> BoxFuture<'t, Result<R, E>> + Send,
    E: From<StoreError>,
{
    let mut tx = store.begin().await?;
    match f(&mut tx).await {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!("[TRANSACTION] rollback failed: {}", rollback_err);
            }
            Err(e)
        }
    }
}

//! In-memory store
//!
//! Holds every table in process memory behind a single async mutex. A
//! transaction takes the lock for its whole lifetime and works on a copy of
//! the state, which replaces the shared state only on commit.

mod state;

pub use state::MemState;

use crate::errors::StoreResult;
use crate::query_builder::{QueryBuilder, UpdateSet};
use crate::traits::{Session, Store, TableMetadata, UnitOfWork};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Process-local store, cheap to clone; clones share the same tables
#[derive(Debug, Clone, Default)]
pub struct MemStore {
    state: Arc<Mutex<MemState>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemStore {
    type Session = MemSession;
    type Transaction = MemTransaction;

    async fn session(&self) -> StoreResult<Self::Session> {
        Ok(MemSession {
            state: Arc::clone(&self.state),
        })
    }

    async fn begin(&self) -> StoreResult<Self::Transaction> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let working = guard.clone();
        tracing::debug!("[TRANSACTION] begin (in-memory)");
        Ok(MemTransaction { guard, working })
    }
}

/// Autocommit session: every call locks the shared state once
#[derive(Debug)]
pub struct MemSession {
    state: Arc<Mutex<MemState>>,
}

#[async_trait]
impl Session for MemSession {
    async fn create<T: TableMetadata>(&mut self, draft: T::Draft) -> StoreResult<T> {
        self.state.lock().await.create::<T>(draft)
    }

    async fn find<T: TableMetadata>(&mut self, query: QueryBuilder) -> StoreResult<Vec<T>> {
        self.state.lock().await.find::<T>(&query)
    }

    async fn count_where<T: TableMetadata>(&mut self, query: QueryBuilder) -> StoreResult<i64> {
        self.state.lock().await.count_where::<T>(&query)
    }

    async fn update_where<T: TableMetadata>(
        &mut self,
        query: QueryBuilder,
        update: UpdateSet,
    ) -> StoreResult<u64> {
        self.state.lock().await.update_where::<T>(&query, &update)
    }

    async fn delete_where<T: TableMetadata>(&mut self, query: QueryBuilder) -> StoreResult<u64> {
        self.state.lock().await.delete_where::<T>(&query)
    }
}

/// Exclusive transaction over the whole in-memory database
pub struct MemTransaction {
    guard: OwnedMutexGuard<MemState>,
    working: MemState,
}

impl std::fmt::Debug for MemTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemTransaction").finish_non_exhaustive()
    }
}

#[async_trait]
impl Session for MemTransaction {
    async fn create<T: TableMetadata>(&mut self, draft: T::Draft) -> StoreResult<T> {
        self.working.create::<T>(draft)
    }

    async fn find<T: TableMetadata>(&mut self, query: QueryBuilder) -> StoreResult<Vec<T>> {
        self.working.find::<T>(&query)
    }

    async fn count_where<T: TableMetadata>(&mut self, query: QueryBuilder) -> StoreResult<i64> {
        self.working.count_where::<T>(&query)
    }

    async fn update_where<T: TableMetadata>(
        &mut self,
        query: QueryBuilder,
        update: UpdateSet,
    ) -> StoreResult<u64> {
        self.working.update_where::<T>(&query, &update)
    }

    async fn delete_where<T: TableMetadata>(&mut self, query: QueryBuilder) -> StoreResult<u64> {
        self.working.delete_where::<T>(&query)
    }
}

#[async_trait]
impl UnitOfWork for MemTransaction {
    async fn commit(self) -> StoreResult<()> {
        let MemTransaction { mut guard, working } = self;
        *guard = working;
        tracing::debug!("[TRANSACTION] commit (in-memory)");
        Ok(())
    }

    async fn rollback(self) -> StoreResult<()> {
        tracing::debug!("[TRANSACTION] rollback (in-memory)");
        Ok(())
    }
}

#[cfg(test)]
mod tests;

use super::session::{PgPooledSession, PgSession, PgTransaction};
use crate::errors::{StoreError, StoreResult};
use crate::traits::Store;
use async_trait::async_trait;
use config::DatabaseConfig;
use sqlx::PgPool;
use std::time::Duration;

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl std::fmt::Debug for PgStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgStore")
            .field("pool_size", &self.pool.size())
            .field("idle", &self.pool.num_idle())
            .finish()
    }
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the connection pool described by `config`
    pub async fn connect(config: &DatabaseConfig) -> StoreResult<Self> {
        let connection_string = config.connection_string();

        let mut pool_options = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds));

        // Set max lifetime if specified
        if config.max_lifetime_seconds > 0 {
            pool_options =
                pool_options.max_lifetime(Duration::from_secs(config.max_lifetime_seconds));
        }

        let pool = pool_options
            .connect(&connection_string)
            .await
            .map_err(StoreError::Connection)?;

        tracing::info!(
            "[CONNECT] PostgreSQL pool ready ({}..{} connections)",
            config.min_connections,
            config.max_connections
        );
        Ok(Self::new(pool))
    }

    /// Get database pool reference
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database connection health
    pub async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::Connection)?;
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    type Session = PgPooledSession;
    type Transaction = PgTransaction;

    async fn session(&self) -> StoreResult<Self::Session> {
        let conn = self.pool.acquire().await.map_err(StoreError::Connection)?;
        Ok(PgSession::new(conn))
    }

    async fn begin(&self) -> StoreResult<Self::Transaction> {
        let tx = self.pool.begin().await.map_err(StoreError::Connection)?;
        Ok(PgSession::new(tx))
    }
}

//! Database migration functionality
//!
//! Creates and drops the `users`, `posts` and `replies` tables for a
//! PostgreSQL-backed [`Commentable`].

use crate::core::Commentable;
use crate::errors::{CommentableError, Result};
use crate::models::{Post, Reply, User};
use store_object::{PgStore, StoreError, TableMetadata};

fn schema_error(table: &'static str, source: sqlx::Error) -> CommentableError {
    CommentableError::Persistence {
        operation: "migrate",
        kind: None,
        id: None,
        source: StoreError::database_operation(table, "migrate", source),
    }
}

impl Commentable<PgStore> {
    async fn execute(&self, table: &'static str, sql: &str) -> Result<()> {
        debug_log!("[MIGRATE] SQL: {}", sql);
        sqlx::query(sql)
            .execute(self.store().pool())
            .await
            .map_err(|e| schema_error(table, e))?;
        Ok(())
    }

    /// Automatically create table, trigger and indexes for a model.
    /// If recreate is true, drops the existing table first.
    pub async fn auto_migrate<T: TableMetadata>(&self, recreate: bool) -> Result<()> {
        let table_name = T::table_name();

        if recreate {
            self.execute(table_name, &T::drop_table_sql()).await?;
        }

        self.execute(table_name, &T::create_table_sql()).await?;

        // updated_at trigger function, shared by every table
        let trigger_function_sql = r#"
        CREATE OR REPLACE FUNCTION update_updated_at_column()
        RETURNS TRIGGER AS $$
        BEGIN
            NEW.updated_at = NOW();
            RETURN NEW;
        END;
        $$ language 'plpgsql';
        "#;
        self.execute(table_name, trigger_function_sql).await?;

        let trigger_sql = format!(
            "DO $$
             BEGIN
                 IF NOT EXISTS (SELECT 1 FROM pg_trigger WHERE tgname = 'update_{0}_updated_at') THEN
                     CREATE TRIGGER update_{0}_updated_at
                     BEFORE UPDATE ON {0}
                     FOR EACH ROW
                     EXECUTE FUNCTION update_updated_at_column();
                 END IF;
             END $$",
            table_name
        );
        self.execute(table_name, &trigger_sql).await?;

        for index_sql in T::create_indexes_sql() {
            self.execute(table_name, &index_sql).await?;
        }

        tracing::debug!("[MIGRATE] table {} ready", table_name);
        Ok(())
    }

    /// Create every table of the reply graph, parents first
    pub async fn migrate(&self) -> Result<()> {
        self.auto_migrate::<User>(false).await?;
        self.auto_migrate::<Post>(false).await?;
        self.auto_migrate::<Reply>(false).await?;
        tracing::info!("[MIGRATE] schema ready");
        Ok(())
    }

    /// Drop every table of the reply graph, dependents first
    pub async fn reset_schema(&self) -> Result<()> {
        self.execute(Reply::table_name(), &Reply::drop_table_sql()).await?;
        self.execute(Post::table_name(), &Post::drop_table_sql()).await?;
        self.execute(User::table_name(), &User::drop_table_sql()).await?;
        tracing::info!("[MIGRATE] schema dropped");
        Ok(())
    }
}

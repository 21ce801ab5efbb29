use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

use lakegen_core::{Column, DataSource, Error, IndexedColumn, Result, RowStats};

use crate::introspector::{Connector, SchemaIntrospector};

mod mapper;
mod queries;

/// Opens a small Postgres pool per data source.
#[derive(Debug, Clone)]
pub struct PostgresConnector {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for PostgresConnector {
    fn default() -> Self {
        Self {
            max_connections: 2,
            acquire_timeout: Duration::from_secs(10),
        }
    }
}

#[async_trait]
impl Connector for PostgresConnector {
    type Session = PostgresIntrospector;

    async fn connect(&self, datasource: &DataSource) -> Result<Self::Session> {
        let options = PgConnectOptions::new()
            .host(&datasource.ip)
            .port(datasource.port)
            .username(&datasource.login)
            .password(&datasource.password)
            .database(&datasource.tns);

        let pool = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout)
            .connect_with(options)
            .await
            .map_err(|err| Error::Connection(err.to_string()))?;

        Ok(PostgresIntrospector::new(pool))
    }
}

/// Introspector for PostgreSQL catalogs.
#[derive(Debug, Clone)]
pub struct PostgresIntrospector {
    pool: PgPool,
}

impl PostgresIntrospector {
    /// Create a new introspector using a pre-configured pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SchemaIntrospector for PostgresIntrospector {
    fn engine(&self) -> &'static str {
        "postgres"
    }

    async fn list_tables(&self, schema: &str) -> Result<Vec<String>> {
        queries::list_tables(&self.pool, schema).await
    }

    async fn get_columns(&self, schema: &str, table: &str) -> Result<Vec<Column>> {
        let raw = queries::list_columns(&self.pool, schema, table).await?;
        let comments = queries::list_column_comments(&self.pool, schema, table).await?;
        Ok(mapper::map_columns(raw, comments))
    }

    async fn get_primary_keys(&self, schema: &str, table: &str) -> Result<Vec<String>> {
        queries::list_constraint_columns(&self.pool, schema, table, "p").await
    }

    async fn get_unique_keys(&self, schema: &str, table: &str) -> Result<Vec<String>> {
        queries::list_constraint_columns(&self.pool, schema, table, "u").await
    }

    async fn get_indexed_columns(&self, schema: &str, table: &str) -> Result<Vec<IndexedColumn>> {
        let raw = queries::list_indexed_columns(&self.pool, schema, table).await?;
        Ok(mapper::map_indexed_columns(raw))
    }

    async fn get_row_stats(&self, schema: &str, table: &str) -> Result<RowStats> {
        let raw = queries::fetch_row_stats(&self.pool, schema, table).await?;
        Ok(mapper::map_row_stats(raw))
    }

    async fn probe_direct_path_permission(&self) -> bool {
        match queries::probe_superuser_catalog(&self.pool).await {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!(event = "direct_path_probe_denied", error = %err);
                false
            }
        }
    }
}

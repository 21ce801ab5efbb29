use async_trait::async_trait;

use lakegen_core::{Column, DataSource, IndexedColumn, Result, RowStats};

/// Catalog queries needed to profile one schema.
#[async_trait]
pub trait SchemaIntrospector: Send + Sync {
    /// Returns the engine identifier (e.g. `postgres`).
    fn engine(&self) -> &'static str;

    async fn list_tables(&self, schema: &str) -> Result<Vec<String>>;

    /// Columns ordered by ordinal, with comments merged in.
    async fn get_columns(&self, schema: &str, table: &str) -> Result<Vec<Column>>;

    /// Primary-key columns ordered by constraint position.
    async fn get_primary_keys(&self, schema: &str, table: &str) -> Result<Vec<String>>;

    async fn get_unique_keys(&self, schema: &str, table: &str) -> Result<Vec<String>>;

    async fn get_indexed_columns(&self, schema: &str, table: &str) -> Result<Vec<IndexedColumn>>;

    async fn get_row_stats(&self, schema: &str, table: &str) -> Result<RowStats>;

    /// Whether the login may use direct-path extraction; `false` on any failure.
    async fn probe_direct_path_permission(&self) -> bool;
}

/// Opens one introspection session per data source.
#[async_trait]
pub trait Connector: Send + Sync {
    type Session: SchemaIntrospector;

    async fn connect(&self, datasource: &DataSource) -> Result<Self::Session>;
}

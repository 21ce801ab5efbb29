use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::types::TypeFamily;

/// One catalog column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Column {
    pub field: String,
    #[serde(rename = "type")]
    pub data_type: String,
    /// Catalog column position; used for tie-breaks.
    #[serde(alias = "id")]
    pub ordinal: i32,
    #[serde(default)]
    pub comment: Option<String>,
}

impl Column {
    pub fn family(&self) -> TypeFamily {
        TypeFamily::of(&self.data_type)
    }
}

/// Index uniqueness as reported by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Uniqueness {
    Unique,
    Nonunique,
}

/// A column participating in an index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct IndexedColumn {
    pub field: String,
    pub uniqueness: Uniqueness,
}

/// Optimizer statistics for a table; either value may be unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowStats {
    pub num_rows: Option<i64>,
    pub avg_row_len: Option<i64>,
}

/// Raw catalog facts for one table, as gathered by an introspector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTableFacts {
    pub table: String,
    pub columns: Vec<Column>,
    /// Primary-key columns ordered by constraint position.
    pub primary_keys: Vec<String>,
    pub unique_keys: Vec<String>,
    pub indexed_columns: Vec<IndexedColumn>,
    pub row_stats: RowStats,
    pub direct: bool,
}

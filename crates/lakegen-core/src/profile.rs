use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::datasource::DataSource;
use crate::error::Result;
use crate::facts::{Column, IndexedColumn};
use crate::types::java_type_override;
use crate::validation::validate_profile;

/// Timestamp format used in profiling metadata.
pub const PROFILE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// Derived ingestion facts for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TableProfile {
    pub table: String,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub primary_keys: Vec<String>,
    #[serde(default)]
    pub unique_keys: Vec<String>,
    #[serde(default)]
    pub unique_indexes: Vec<String>,
    #[serde(default)]
    pub indexed_columns: Vec<IndexedColumn>,
    #[serde(default)]
    pub no_key: bool,
    #[serde(default)]
    pub split_by: Option<String>,
    #[serde(default)]
    pub merge_key: Option<String>,
    #[serde(default)]
    pub check_column: Option<String>,
    #[serde(default)]
    pub num_rows: Option<i64>,
    #[serde(default)]
    pub avg_row_len: Option<i64>,
    #[serde(default)]
    pub estimated_size: Option<i64>,
    #[serde(default)]
    pub direct: bool,
}

impl TableProfile {
    /// Profile carrying only explicit merge/check columns, as read from a table list.
    ///
    /// A declared merge key is recorded as the table's unique key.
    pub fn declared(
        table: impl Into<String>,
        merge_key: Option<String>,
        check_column: Option<String>,
    ) -> Self {
        let no_key = merge_key.is_none();
        Self {
            table: table.into(),
            columns: Vec::new(),
            primary_keys: Vec::new(),
            unique_keys: merge_key.iter().cloned().collect(),
            unique_indexes: Vec::new(),
            indexed_columns: Vec::new(),
            no_key,
            split_by: None,
            merge_key,
            check_column,
            num_rows: None,
            avg_row_len: None,
            estimated_size: None,
            direct: false,
        }
    }

    /// Check the profile invariants.
    pub fn validate(&self) -> Result<()> {
        validate_profile(self)
    }

    pub fn has_column(&self, field: &str) -> bool {
        self.columns.iter().any(|col| col.field == field)
    }

    /// Columns in catalog order.
    pub fn ordered_columns(&self) -> Vec<&Column> {
        let mut columns: Vec<&Column> = self.columns.iter().collect();
        columns.sort_by_key(|col| col.ordinal);
        columns
    }

    /// `FIELD=JavaType` pairs for columns whose Java mapping must be forced.
    pub fn java_type_overrides(&self) -> Vec<String> {
        self.ordered_columns()
            .into_iter()
            .filter_map(|col| {
                java_type_override(&col.data_type).map(|java| format!("{}={java}", col.field))
            })
            .collect()
    }
}

/// Run metadata attached to each profile document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ProfilingMetadata {
    #[serde(default)]
    pub start_dt: Option<String>,
    #[serde(default)]
    pub end_dt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<String>,
}

/// All table profiles for one data source plus run metadata.
///
/// Documents are produced by [`ProfileBuilder`] or deserialized from a
/// profiling file; they are read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ProfileDocument {
    datasource: DataSource,
    #[serde(default)]
    tables: Vec<TableProfile>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    direct: bool,
    #[serde(default)]
    profiling_metadata: ProfilingMetadata,
}

impl ProfileDocument {
    pub fn datasource(&self) -> &DataSource {
        &self.datasource
    }

    pub fn tables(&self) -> &[TableProfile] {
        &self.tables
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn direct(&self) -> bool {
        self.direct
    }

    pub fn metadata(&self) -> &ProfilingMetadata {
        &self.profiling_metadata
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Accumulates table profiles while a source is being profiled.
#[derive(Debug)]
pub struct ProfileBuilder {
    datasource: DataSource,
    tables: Vec<TableProfile>,
    metadata: ProfilingMetadata,
}

impl ProfileBuilder {
    /// Open a document at profiling start.
    pub fn start(datasource: DataSource, start_dt: impl Into<String>) -> Self {
        Self {
            datasource,
            tables: Vec::new(),
            metadata: ProfilingMetadata {
                start_dt: Some(start_dt.into()),
                ..ProfilingMetadata::default()
            },
        }
    }

    pub fn with_run_info(mut self, user: Option<String>, working_directory: Option<String>) -> Self {
        self.metadata.user = user;
        self.metadata.working_directory = working_directory;
        self
    }

    pub fn push_table(&mut self, table: TableProfile) {
        self.tables.push(table);
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Seal a successfully profiled source; `direct` is stamped on every table.
    pub fn seal(self, end_dt: impl Into<String>, direct: bool) -> ProfileDocument {
        let mut metadata = self.metadata;
        metadata.end_dt = Some(end_dt.into());
        let tables = self
            .tables
            .into_iter()
            .map(|table| TableProfile { direct, ..table })
            .collect();

        ProfileDocument {
            datasource: self.datasource,
            tables,
            error: None,
            direct,
            profiling_metadata: metadata,
        }
    }

    /// Seal a failed source; partially profiled tables are discarded.
    pub fn seal_failed(self, end_dt: impl Into<String>, error: impl Into<String>) -> ProfileDocument {
        let mut metadata = self.metadata;
        metadata.end_dt = Some(end_dt.into());

        ProfileDocument {
            datasource: self.datasource,
            tables: Vec::new(),
            error: Some(error.into()),
            direct: false,
            profiling_metadata: metadata,
        }
    }
}

/// A profiling file holds either one document or a list of them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ProfileFile {
    Many(Vec<ProfileDocument>),
    One(ProfileDocument),
}

impl ProfileFile {
    pub fn into_documents(self) -> Vec<ProfileDocument> {
        match self {
            ProfileFile::Many(documents) => documents,
            ProfileFile::One(document) => vec![document],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::Column;

    fn datasource() -> DataSource {
        DataSource {
            name: "DS1".to_string(),
            ip: "10.0.0.1".to_string(),
            port: 1521,
            tns: "ORCL".to_string(),
            schema: "SCHEMA".to_string(),
            login: "reader".to_string(),
            password: "pw".to_string(),
        }
    }

    #[test]
    fn seal_stamps_direct_on_tables() {
        let mut builder = ProfileBuilder::start(datasource(), "2026-01-01-00-00-00");
        builder.push_table(TableProfile::declared("T1", None, None));
        let doc = builder.seal("2026-01-01-00-01-00", true);

        assert!(doc.direct());
        assert!(doc.tables().iter().all(|table| table.direct));
        assert_eq!(doc.metadata().end_dt.as_deref(), Some("2026-01-01-00-01-00"));
        assert!(!doc.is_failed());
    }

    #[test]
    fn failed_seal_discards_partial_tables() {
        let mut builder = ProfileBuilder::start(datasource(), "2026-01-01-00-00-00");
        builder.push_table(TableProfile::declared("T1", None, None));
        let doc = builder.seal_failed("2026-01-01-00-01-00", "connection reset");

        assert!(doc.tables().is_empty());
        assert_eq!(doc.error(), Some("connection reset"));
    }

    #[test]
    fn declared_profile_keeps_key_invariant() {
        let keyed = TableProfile::declared("T1", Some("ID".to_string()), None);
        assert!(!keyed.no_key);
        assert_eq!(keyed.unique_keys, vec!["ID".to_string()]);
        assert!(keyed.validate().is_ok());

        let unkeyed = TableProfile::declared("T2", None, Some("LAST_UPD".to_string()));
        assert!(unkeyed.no_key);
        assert!(unkeyed.validate().is_ok());
    }

    #[test]
    fn java_overrides_follow_column_order() {
        let mut table = TableProfile::declared("T1", None, None);
        table.columns = vec![
            Column {
                field: "UPDATED".to_string(),
                data_type: "DATE".to_string(),
                ordinal: 3,
                comment: None,
            },
            Column {
                field: "CREATED".to_string(),
                data_type: "DATE".to_string(),
                ordinal: 1,
                comment: None,
            },
            Column {
                field: "ID".to_string(),
                data_type: "NUMBER".to_string(),
                ordinal: 2,
                comment: None,
            },
        ];

        assert_eq!(
            table.java_type_overrides(),
            vec!["CREATED=String".to_string(), "UPDATED=String".to_string()]
        );
    }
}

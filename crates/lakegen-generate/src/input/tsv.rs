use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use lakegen_core::{DataSource, ProfileBuilder, ProfileDocument, TableProfile};

use crate::errors::{GenerationError, Result};

/// One line of a tab-separated table list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TableListRow {
    #[serde(rename = "Datasource")]
    pub datasource: String,
    #[serde(rename = "Schema")]
    pub schema: String,
    #[serde(rename = "Table")]
    pub table: String,
    #[serde(rename = "MergeKey", default)]
    pub merge_key: Option<String>,
    #[serde(rename = "CheckColumn", default)]
    pub check_column: Option<String>,
}

pub fn read_table_list(path: &Path) -> Result<Vec<ProfileDocument>> {
    let file = std::fs::File::open(path)?;
    parse_table_list(file)
}

/// Parse a table list into one document per `(Datasource, Schema)`, in
/// first-seen order.
///
/// Empty cells are absent values; the data source carries no connection
/// details.
pub fn parse_table_list<R: Read>(reader: R) -> Result<Vec<ProfileDocument>> {
    let mut csv = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut groups: Vec<(DataSource, Vec<TableProfile>)> = Vec::new();
    for (idx, row) in csv.deserialize::<TableListRow>().enumerate() {
        let row = row?;
        if row.datasource.is_empty() || row.schema.is_empty() || row.table.is_empty() {
            return Err(GenerationError::InvalidInput(format!(
                "table list line {}: Datasource, Schema and Table are required",
                idx + 2
            )));
        }

        let TableListRow {
            datasource,
            schema,
            table,
            merge_key,
            check_column,
        } = row;
        let table = TableProfile::declared(table, non_empty(merge_key), non_empty(check_column));
        match groups
            .iter_mut()
            .find(|(ds, _)| ds.name == datasource && ds.schema == schema)
        {
            Some((_, tables)) => tables.push(table),
            None => groups.push((file_datasource(datasource, schema), vec![table])),
        }
    }

    tracing::debug!(event = "table_list_read", sources = groups.len());
    Ok(groups
        .into_iter()
        .map(|(datasource, tables)| {
            let mut builder = ProfileBuilder::start(datasource, "");
            for table in tables {
                builder.push_table(table);
            }
            builder.seal("", false)
        })
        .collect())
}

fn file_datasource(name: String, schema: String) -> DataSource {
    DataSource {
        name,
        ip: String::new(),
        port: 0,
        tns: String::new(),
        schema,
        login: String::new(),
        password: String::new(),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

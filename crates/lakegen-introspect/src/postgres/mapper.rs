use std::collections::BTreeMap;

use lakegen_core::{Column, IndexedColumn, RowStats, Uniqueness};

use super::queries::{RawColumn, RawColumnComment, RawIndexedColumn, RawRowStats};

pub fn map_columns(raw: Vec<RawColumn>, comments: Vec<RawColumnComment>) -> Vec<Column> {
    let mut comments: BTreeMap<String, String> = comments
        .into_iter()
        .map(|row| (row.name, row.comment))
        .collect();

    let mut columns: Vec<Column> = raw
        .into_iter()
        .map(|col| Column {
            comment: comments.remove(&col.name),
            field: col.name,
            data_type: col.data_type,
            ordinal: col.ordinal,
        })
        .collect();
    columns.sort_by_key(|col| col.ordinal);
    columns
}

pub fn map_indexed_columns(raw: Vec<RawIndexedColumn>) -> Vec<IndexedColumn> {
    raw.into_iter()
        .map(|row| IndexedColumn {
            field: row.name,
            uniqueness: if row.is_unique {
                Uniqueness::Unique
            } else {
                Uniqueness::Nonunique
            },
        })
        .collect()
}

pub fn map_row_stats(raw: Option<RawRowStats>) -> RowStats {
    raw.map(|row| RowStats {
        num_rows: row.num_rows.filter(|rows| *rows >= 0),
        avg_row_len: row.avg_row_len,
    })
    .unwrap_or_default()
}

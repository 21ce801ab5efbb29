//! Derivation of per-table ingestion facts from raw catalog facts.
//!
//! Every heuristic is an ordered rule table evaluated top to bottom; the
//! first rule that selects a column wins.

use std::collections::BTreeSet;

use crate::facts::{Column, IndexedColumn, RawTableFacts, Uniqueness};
use crate::profile::TableProfile;
use crate::types::TypeFamily;

const GIB: i64 = 1024 * 1024 * 1024;

/// Lower bound for the parallel mapper count.
pub const MIN_MAPPERS: u32 = 2;
/// Upper bound for the parallel mapper count.
pub const MAX_MAPPERS: u32 = 20;

/// Column literally excluded from watermark detection.
const EXCLUDED_WATERMARK: &str = "DB_LAST_UPD";
const UPDATE_KEYWORDS: &[&str] = &["LAST_UPD", "MOD_T", "UPDATED_TIME"];
const CREATE_KEYWORDS: &[&str] = &["CREATED"];

/// Column population a rule searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Candidates {
    PrimaryKeys,
    UniqueKeys,
    Indexed,
    All,
}

const SPLIT_BY_RULES: &[(Candidates, TypeFamily)] = &[
    (Candidates::PrimaryKeys, TypeFamily::Date),
    (Candidates::PrimaryKeys, TypeFamily::Number),
    (Candidates::UniqueKeys, TypeFamily::Date),
    (Candidates::UniqueKeys, TypeFamily::Number),
    (Candidates::Indexed, TypeFamily::Date),
    (Candidates::Indexed, TypeFamily::Number),
    (Candidates::All, TypeFamily::Date),
    (Candidates::All, TypeFamily::Number),
];

/// Watermark rule: name keywords plus whether the index/type constraint applies.
#[derive(Debug, Clone, Copy)]
struct WatermarkRule {
    keywords: &'static [&'static str],
    constrained: bool,
}

const CHECK_COLUMN_RULES: &[WatermarkRule] = &[
    WatermarkRule {
        keywords: UPDATE_KEYWORDS,
        constrained: true,
    },
    WatermarkRule {
        keywords: CREATE_KEYWORDS,
        constrained: true,
    },
    WatermarkRule {
        keywords: UPDATE_KEYWORDS,
        constrained: false,
    },
    WatermarkRule {
        keywords: CREATE_KEYWORDS,
        constrained: false,
    },
];

/// Key sets looked up while evaluating rules.
struct KeySets<'a> {
    primary: BTreeSet<&'a str>,
    unique: BTreeSet<&'a str>,
    unique_indexes: BTreeSet<&'a str>,
    indexed: BTreeSet<&'a str>,
}

impl<'a> KeySets<'a> {
    fn new(facts: &'a RawTableFacts) -> Self {
        Self {
            primary: facts.primary_keys.iter().map(String::as_str).collect(),
            unique: facts.unique_keys.iter().map(String::as_str).collect(),
            unique_indexes: facts
                .indexed_columns
                .iter()
                .filter(|idx| idx.uniqueness == Uniqueness::Unique)
                .map(|idx| idx.field.as_str())
                .collect(),
            indexed: facts
                .indexed_columns
                .iter()
                .map(|idx| idx.field.as_str())
                .collect(),
        }
    }

    fn contains(&self, candidates: Candidates, field: &str) -> bool {
        match candidates {
            Candidates::PrimaryKeys => self.primary.contains(field),
            Candidates::UniqueKeys => self.unique.contains(field),
            Candidates::Indexed => self.indexed.contains(field),
            Candidates::All => true,
        }
    }
}

/// Derive a [`TableProfile`] from raw catalog facts.
pub fn infer(facts: RawTableFacts) -> TableProfile {
    let mut columns = facts.columns.clone();
    columns.sort_by_key(|col| col.ordinal);

    let keys = KeySets::new(&facts);
    let split_by = select_split_by(&columns, &keys);
    let merge_key = select_merge_key(&columns, &keys);
    let check_column = select_check_column(&columns, &keys);
    let unique_indexes = unique_index_fields(&facts.indexed_columns);
    let no_key = facts.primary_keys.is_empty() && facts.unique_keys.is_empty();
    let estimated_size = estimate_size(facts.row_stats.num_rows, facts.row_stats.avg_row_len);

    TableProfile {
        table: facts.table,
        columns,
        primary_keys: facts.primary_keys,
        unique_keys: facts.unique_keys,
        unique_indexes,
        indexed_columns: facts.indexed_columns,
        no_key,
        split_by,
        merge_key,
        check_column,
        num_rows: facts.row_stats.num_rows,
        avg_row_len: facts.row_stats.avg_row_len,
        estimated_size,
        direct: facts.direct,
    }
}

fn select_split_by(columns: &[Column], keys: &KeySets<'_>) -> Option<String> {
    SPLIT_BY_RULES.iter().find_map(|(candidates, family)| {
        columns
            .iter()
            .find(|col| keys.contains(*candidates, &col.field) && col.family() == *family)
            .map(|col| col.field.clone())
    })
}

fn select_merge_key(columns: &[Column], keys: &KeySets<'_>) -> Option<String> {
    columns
        .iter()
        .find(|col| {
            let field = col.field.as_str();
            keys.unique_indexes.contains(field)
                || keys.unique.contains(field)
                || keys.primary.contains(field)
        })
        .map(|col| col.field.clone())
}

fn select_check_column(columns: &[Column], keys: &KeySets<'_>) -> Option<String> {
    CHECK_COLUMN_RULES.iter().find_map(|rule| {
        columns
            .iter()
            .find(|col| watermark_matches(rule, col, keys))
            .map(|col| col.field.clone())
    })
}

fn watermark_matches(rule: &WatermarkRule, col: &Column, keys: &KeySets<'_>) -> bool {
    if col.field == EXCLUDED_WATERMARK {
        return false;
    }
    if !rule.keywords.iter().any(|kw| col.field.contains(kw)) {
        return false;
    }
    if rule.constrained {
        return keys.indexed.contains(col.field.as_str()) && col.family().is_date_or_number();
    }
    true
}

fn unique_index_fields(indexed: &[IndexedColumn]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    indexed
        .iter()
        .filter(|idx| idx.uniqueness == Uniqueness::Unique)
        .filter(|idx| seen.insert(idx.field.clone()))
        .map(|idx| idx.field.clone())
        .collect()
}

/// `num_rows * avg_row_len` when both are known.
pub fn estimate_size(num_rows: Option<i64>, avg_row_len: Option<i64>) -> Option<i64> {
    match (num_rows, avg_row_len) {
        (Some(rows), Some(len)) => Some(rows.saturating_mul(len)),
        _ => None,
    }
}

/// Parallel mapper count: whole GiB of estimated size, clamped to `[2, 20]`.
pub fn mapper_count(estimated_size: Option<i64>) -> u32 {
    let gib = estimated_size.unwrap_or(0).max(0) / GIB;
    let gib = u32::try_from(gib).unwrap_or(u32::MAX);
    gib.clamp(MIN_MAPPERS, MAX_MAPPERS)
}

/// Mapper remap applied to incremental workflows only.
pub fn incremental_mapper_count(base: u32) -> u32 {
    if base < 5 {
        1
    } else if base > 10 {
        10
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::RowStats;

    fn col(field: &str, data_type: &str, ordinal: i32) -> Column {
        Column {
            field: field.to_string(),
            data_type: data_type.to_string(),
            ordinal,
            comment: None,
        }
    }

    fn idx(field: &str, uniqueness: Uniqueness) -> IndexedColumn {
        IndexedColumn {
            field: field.to_string(),
            uniqueness,
        }
    }

    fn facts(columns: Vec<Column>) -> RawTableFacts {
        RawTableFacts {
            table: "T1".to_string(),
            columns,
            ..RawTableFacts::default()
        }
    }

    #[test]
    fn id_and_last_upd_example() {
        let mut raw = facts(vec![col("ID", "NUMBER", 1), col("LAST_UPD", "DATE", 2)]);
        raw.primary_keys = vec!["ID".to_string()];
        raw.indexed_columns = vec![idx("LAST_UPD", Uniqueness::Nonunique)];

        let profile = infer(raw);
        assert_eq!(profile.split_by.as_deref(), Some("ID"));
        assert_eq!(profile.check_column.as_deref(), Some("LAST_UPD"));
        assert_eq!(profile.merge_key.as_deref(), Some("ID"));
        assert!(!profile.no_key);
    }

    #[test]
    fn date_primary_key_wins_with_lowest_ordinal() {
        let mut raw = facts(vec![
            col("ID", "NUMBER", 1),
            col("VALID_TO", "DATE", 4),
            col("VALID_FROM", "DATE", 3),
        ]);
        raw.primary_keys = vec!["ID".to_string(), "VALID_TO".to_string(), "VALID_FROM".to_string()];

        let profile = infer(raw);
        assert_eq!(profile.split_by.as_deref(), Some("VALID_FROM"));
    }

    #[test]
    fn split_by_falls_back_through_candidate_sets() {
        let mut raw = facts(vec![
            col("NAME", "VARCHAR2", 1),
            col("SEQ", "NUMBER", 2),
            col("CODE", "NUMBER", 3),
        ]);
        raw.unique_keys = vec!["NAME".to_string()];
        raw.indexed_columns = vec![idx("CODE", Uniqueness::Nonunique)];
        assert_eq!(infer(raw).split_by.as_deref(), Some("CODE"));

        let raw = facts(vec![col("NAME", "VARCHAR2", 1), col("SEQ", "NUMBER", 2)]);
        assert_eq!(infer(raw).split_by.as_deref(), Some("SEQ"));

        let raw = facts(vec![col("NAME", "VARCHAR2", 1)]);
        assert_eq!(infer(raw).split_by, None);
    }

    #[test]
    fn merge_key_follows_column_order() {
        let mut raw = facts(vec![
            col("EXTERNAL_REF", "VARCHAR2", 1),
            col("ID", "NUMBER", 2),
        ]);
        raw.primary_keys = vec!["ID".to_string()];
        raw.indexed_columns = vec![idx("EXTERNAL_REF", Uniqueness::Unique)];

        let profile = infer(raw);
        assert_eq!(profile.merge_key.as_deref(), Some("EXTERNAL_REF"));
        assert_eq!(profile.unique_indexes, vec!["EXTERNAL_REF".to_string()]);
        assert!(!profile.no_key);
    }

    #[test]
    fn merge_key_is_none_without_any_keys() {
        let mut raw = facts(vec![col("A", "NUMBER", 1), col("B", "DATE", 2)]);
        raw.indexed_columns = vec![idx("A", Uniqueness::Nonunique)];

        let profile = infer(raw);
        assert_eq!(profile.merge_key, None);
        assert!(profile.no_key);
    }

    #[test]
    fn unique_index_alone_gives_merge_key_but_no_key() {
        let mut raw = facts(vec![col("A", "NUMBER", 1)]);
        raw.indexed_columns = vec![idx("A", Uniqueness::Unique)];

        let profile = infer(raw);
        assert_eq!(profile.merge_key.as_deref(), Some("A"));
        assert!(profile.no_key);
    }

    #[test]
    fn check_column_skips_db_last_upd() {
        let mut raw = facts(vec![
            col("DB_LAST_UPD", "DATE", 1),
            col("LAST_UPD", "DATE", 2),
        ]);
        raw.indexed_columns = vec![
            idx("DB_LAST_UPD", Uniqueness::Nonunique),
            idx("LAST_UPD", Uniqueness::Nonunique),
        ];
        assert_eq!(infer(raw).check_column.as_deref(), Some("LAST_UPD"));
    }

    #[test]
    fn check_column_prefers_indexed_created_over_unindexed_update() {
        let mut raw = facts(vec![col("LAST_UPD", "DATE", 1), col("CREATED", "DATE", 2)]);
        raw.indexed_columns = vec![idx("CREATED", Uniqueness::Nonunique)];
        assert_eq!(infer(raw).check_column.as_deref(), Some("CREATED"));
    }

    #[test]
    fn check_column_relaxes_constraints() {
        let raw = facts(vec![col("CREATED", "DATE", 1), col("MOD_T", "VARCHAR2", 2)]);
        assert_eq!(infer(raw).check_column.as_deref(), Some("MOD_T"));

        let raw = facts(vec![col("ROW_CREATED", "VARCHAR2", 1)]);
        assert_eq!(infer(raw).check_column.as_deref(), Some("ROW_CREATED"));

        let raw = facts(vec![col("DB_LAST_UPD", "DATE", 1)]);
        assert_eq!(infer(raw).check_column, None);
    }

    #[test]
    fn degenerate_table_resolves_to_none() {
        let profile = infer(facts(Vec::new()));
        assert!(profile.no_key);
        assert_eq!(profile.split_by, None);
        assert_eq!(profile.merge_key, None);
        assert_eq!(profile.check_column, None);
        assert_eq!(profile.estimated_size, None);
    }

    #[test]
    fn estimated_size_needs_both_stats() {
        let mut raw = facts(Vec::new());
        raw.row_stats = RowStats {
            num_rows: Some(1_000),
            avg_row_len: Some(120),
        };
        assert_eq!(infer(raw).estimated_size, Some(120_000));

        assert_eq!(estimate_size(Some(10), None), None);
        assert_eq!(estimate_size(None, Some(10)), None);
    }

    #[test]
    fn mapper_count_is_clamped() {
        assert_eq!(mapper_count(None), 2);
        assert_eq!(mapper_count(Some(0)), 2);
        assert_eq!(mapper_count(Some(7 * GIB + 5)), 7);
        assert_eq!(mapper_count(Some(300 * GIB)), 20);
    }

    #[test]
    fn incremental_remap_collapses_extremes() {
        assert_eq!(incremental_mapper_count(2), 1);
        assert_eq!(incremental_mapper_count(4), 1);
        assert_eq!(incremental_mapper_count(5), 5);
        assert_eq!(incremental_mapper_count(10), 10);
        assert_eq!(incremental_mapper_count(20), 10);
    }
}

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::profile::{ProfileDocument, TableProfile};

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Size/key bucket used to triage tables before scheduling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeClass {
    LessThan1,
    LessThan5,
    MoreThan5HasPkeyukeyHasLastupd,
    MoreThan5HasPkeyukeyNoLastupd,
    MoreThan5NoPkeyukeyHasLastupd,
    MoreThan5NoPkeyukeyNoLastupd,
}

impl SizeClass {
    pub fn as_str(self) -> &'static str {
        match self {
            SizeClass::LessThan1 => "less_than_1",
            SizeClass::LessThan5 => "less_than_5",
            SizeClass::MoreThan5HasPkeyukeyHasLastupd => "more_than_5_has_pkeyukey_has_lastupd",
            SizeClass::MoreThan5HasPkeyukeyNoLastupd => "more_than_5_has_pkeyukey_no_lastupd",
            SizeClass::MoreThan5NoPkeyukeyHasLastupd => "more_than_5_no_pkeyukey_has_lastupd",
            SizeClass::MoreThan5NoPkeyukeyNoLastupd => "more_than_5_no_pkeyukey_no_lastupd",
        }
    }
}

/// Classify a table by estimated size (GiB), key presence and a `LAST_UPD` column.
pub fn classify_table(table: &TableProfile) -> SizeClass {
    let size_gb = table.estimated_size.unwrap_or(0) as f64 / GIB;
    if size_gb <= 1.0 {
        return SizeClass::LessThan1;
    }
    if size_gb < 5.0 {
        return SizeClass::LessThan5;
    }

    let keyed = !table.primary_keys.is_empty() || !table.unique_keys.is_empty();
    let last_upd = table.has_column("LAST_UPD");
    match (keyed, last_upd) {
        (true, true) => SizeClass::MoreThan5HasPkeyukeyHasLastupd,
        (true, false) => SizeClass::MoreThan5HasPkeyukeyNoLastupd,
        (false, true) => SizeClass::MoreThan5NoPkeyukeyHasLastupd,
        (false, false) => SizeClass::MoreThan5NoPkeyukeyNoLastupd,
    }
}

/// Top-level metrics report for a profiling run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileMetrics {
    pub counts: ProfileCounts,
    pub coverage: CoverageMetrics,
    pub size_classes: BTreeMap<String, usize>,
    pub tables: Vec<ClassifiedTable>,
    pub warnings: Vec<String>,
}

/// Count summary for a profiling run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileCounts {
    pub sources: usize,
    pub failed_sources: usize,
    pub tables: usize,
    pub columns: usize,
    pub direct_sources: usize,
}

/// Share of tables for which each derived column was found.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageMetrics {
    pub tables_with_key_pct: f64,
    pub split_by_pct: f64,
    pub merge_key_pct: f64,
    pub check_column_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedTable {
    pub source: String,
    pub table: String,
    pub class: SizeClass,
}

/// Collect metrics over all documents of a profiling run.
pub fn collect_profile_metrics(documents: &[ProfileDocument]) -> ProfileMetrics {
    let mut counts = ProfileCounts {
        sources: 0,
        failed_sources: 0,
        tables: 0,
        columns: 0,
        direct_sources: 0,
    };
    let mut with_key = 0usize;
    let mut with_split = 0usize;
    let mut with_merge = 0usize;
    let mut with_check = 0usize;
    let mut size_classes = BTreeMap::new();
    let mut tables = Vec::new();
    let mut warnings = Vec::new();

    for document in documents {
        counts.sources += 1;
        let source = document.datasource().source_name();
        if let Some(error) = document.error() {
            counts.failed_sources += 1;
            warnings.push(format!("source {source} failed: {error}"));
        }
        if document.direct() {
            counts.direct_sources += 1;
        }

        for table in document.tables() {
            counts.tables += 1;
            counts.columns += table.columns.len();
            with_key += usize::from(!table.no_key);
            with_split += usize::from(table.split_by.is_some());
            with_merge += usize::from(table.merge_key.is_some());
            with_check += usize::from(table.check_column.is_some());

            let class = classify_table(table);
            *size_classes.entry(class.as_str().to_string()).or_insert(0) += 1;
            tables.push(ClassifiedTable {
                source: source.clone(),
                table: table.table.clone(),
                class,
            });
        }
    }

    let total = counts.tables as f64;
    let pct = |n: usize| if total > 0.0 { n as f64 / total } else { 0.0 };

    ProfileMetrics {
        coverage: CoverageMetrics {
            tables_with_key_pct: pct(with_key),
            split_by_pct: pct(with_split),
            merge_key_pct: pct(with_merge),
            check_column_pct: pct(with_check),
        },
        counts,
        size_classes,
        tables,
        warnings,
    }
}

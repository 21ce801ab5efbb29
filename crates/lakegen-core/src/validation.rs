use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::profile::TableProfile;

/// Validate internal consistency of a table profile.
///
/// This checks:
/// - duplicate column names
/// - `no_key` agrees with the primary/unique key sets
/// - key, split, merge and check columns exist (skipped when no column list is known)
pub fn validate_profile(profile: &TableProfile) -> Result<()> {
    let mut columns = BTreeSet::new();
    for column in &profile.columns {
        if !columns.insert(column.field.as_str()) {
            return Err(Error::InvalidProfile(format!(
                "duplicate column name: {}.{}",
                profile.table, column.field
            )));
        }
    }

    let keyless = profile.primary_keys.is_empty() && profile.unique_keys.is_empty();
    if profile.no_key != keyless {
        return Err(Error::InvalidProfile(format!(
            "no_key={} disagrees with key sets on table {}",
            profile.no_key, profile.table
        )));
    }

    if columns.is_empty() {
        return Ok(());
    }

    let key_columns = profile
        .primary_keys
        .iter()
        .map(|field| ("primary key", field))
        .chain(profile.unique_keys.iter().map(|field| ("unique key", field)))
        .chain(profile.unique_indexes.iter().map(|field| ("unique index", field)))
        .chain(
            profile
                .indexed_columns
                .iter()
                .map(|idx| ("indexed", &idx.field)),
        );
    for (kind, field) in key_columns {
        if !columns.contains(field.as_str()) {
            return Err(Error::InvalidProfile(format!(
                "{kind} column not found: {}.{}",
                profile.table, field
            )));
        }
    }

    let derived = [
        ("split_by", &profile.split_by),
        ("merge_key", &profile.merge_key),
        ("check_column", &profile.check_column),
    ];
    for (kind, field) in derived {
        if let Some(field) = field {
            if !columns.contains(field.as_str()) {
                return Err(Error::InvalidProfile(format!(
                    "{kind} column not found: {}.{}",
                    profile.table, field
                )));
            }
        }
    }

    Ok(())
}

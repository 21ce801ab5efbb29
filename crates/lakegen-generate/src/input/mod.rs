//! Generator inputs: profiling documents or a table list.

mod tsv;

use std::path::Path;

use lakegen_core::{ProfileDocument, ProfileFile};

use crate::errors::Result;

pub use tsv::{parse_table_list, read_table_list, TableListRow};

/// Read a profiling file holding one document or an array of them.
pub fn read_profile_file(path: &Path) -> Result<Vec<ProfileDocument>> {
    let text = std::fs::read_to_string(path)?;
    parse_profile_json(&text)
}

pub fn parse_profile_json(text: &str) -> Result<Vec<ProfileDocument>> {
    let file: ProfileFile = serde_json::from_str(text)?;
    let documents = file.into_documents();
    tracing::debug!(event = "profile_file_read", documents = documents.len());
    Ok(documents)
}

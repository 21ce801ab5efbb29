use std::collections::BTreeSet;

/// Options that control how a data source is profiled.
#[derive(Debug, Clone)]
pub struct ProfileOptions {
    /// Connection attempts before the source is marked failed.
    pub max_attempts: u32,
    /// `SCHEMA.TABLE` entries to skip, compared case-insensitively.
    pub exclude_tables: BTreeSet<String>,
    pub user: Option<String>,
    pub working_directory: Option<String>,
}

impl Default for ProfileOptions {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            exclude_tables: BTreeSet::new(),
            user: None,
            working_directory: None,
        }
    }
}

impl ProfileOptions {
    pub fn with_excludes<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.exclude_tables
            .extend(entries.into_iter().map(|entry| entry.as_ref().to_uppercase()));
        self
    }

    pub fn is_excluded(&self, schema: &str, table: &str) -> bool {
        self.exclude_tables
            .contains(&format!("{schema}.{table}").to_uppercase())
    }
}

use std::collections::BTreeMap;

use lakegen_config::{ConditionContext, ConditionField};
use lakegen_core::{mapper_count, DataSource, ProfileDocument, TableProfile};

/// Keys that always come from the table identity.
pub const IDENTITY_KEYS: [&str; 3] = ["source_name", "schema", "table"];

/// Per-job substitution values (`opts`): table facts, stage and process
/// fields, then explicit overrides.
///
/// A key mapped to `None` is known but absent; it renders as an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobParams {
    values: BTreeMap<String, Option<String>>,
    overrides: Vec<String>,
}

impl JobParams {
    /// Values derived from a profiled table and its data source.
    pub fn for_table(document: &ProfileDocument, table: &TableProfile) -> Self {
        let datasource = document.datasource();
        let mut params = Self::identity(datasource, &table.table);

        params.set("host", Some(datasource.ip.clone()));
        params.set("port", Some(datasource.port.to_string()));
        params.set("tns", Some(datasource.tns.clone()));
        params.set("username", Some(datasource.login.clone()));
        params.set("password", Some(datasource.password.clone()));
        params.set("direct", Some(table.direct.to_string()));
        params.set("mapper", Some(mapper_count(table.estimated_size).to_string()));
        params.set("split_by", table.split_by.clone());
        params.set("merge_column", table.merge_key.clone());
        params.set("check_column", table.check_column.clone());
        params.set("reconcile", Some(reconcile(table).to_string()));

        let java = table.java_type_overrides();
        params.set("columns_java", (!java.is_empty()).then(|| java.join(",")));
        params
    }

    fn identity(datasource: &DataSource, table: &str) -> Self {
        let mut params = Self::default();
        params.set("source_name", Some(datasource.source_name()));
        params.set("schema", Some(datasource.schema.clone()));
        params.set("table", Some(table.to_string()));
        params
    }

    pub fn set(&mut self, key: &str, value: Option<String>) {
        self.values.insert(key.to_string(), value);
    }

    /// Apply an explicit override; identity keys are refused.
    ///
    /// Returns `false` when the override was ignored.
    pub fn apply_override(&mut self, key: &str, value: &str) -> bool {
        if IDENTITY_KEYS.contains(&key) {
            return false;
        }
        if !self.overrides.iter().any(|existing| existing == key) {
            self.overrides.push(key.to_string());
        }
        self.set(key, Some(value.to_string()));
        true
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Present value of `key`, flattening absent values to `None`.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(|value| value.as_deref())
    }

    /// Values visible to config templates; absent values are empty strings.
    pub fn template_values(&self) -> BTreeMap<String, String> {
        self.values
            .iter()
            .map(|(key, value)| (key.clone(), value.clone().unwrap_or_default()))
            .collect()
    }

    /// Rendered value of a known key.
    pub fn rendered(&self, key: &str) -> String {
        self.value(key).unwrap_or_default().to_string()
    }

    /// Override keys in the order they were first applied.
    pub fn override_keys(&self) -> &[String] {
        &self.overrides
    }

    pub fn source_name(&self) -> &str {
        self.value("source_name").unwrap_or_default()
    }

    pub fn schema(&self) -> &str {
        self.value("schema").unwrap_or_default()
    }

    pub fn table(&self) -> &str {
        self.value("table").unwrap_or_default()
    }
}

impl ConditionContext for JobParams {
    fn field(&self, field: ConditionField) -> Option<&str> {
        self.value(field.as_str())
    }
}

fn reconcile(table: &TableProfile) -> &'static str {
    if table.merge_key.is_some() {
        "merge"
    } else {
        "append"
    }
}

#[cfg(test)]
mod tests {
    use lakegen_core::ProfileBuilder;

    use super::*;

    fn document(table: TableProfile) -> ProfileDocument {
        let datasource = DataSource {
            name: "SIEBEL NOVA".to_string(),
            ip: "10.0.0.5".to_string(),
            port: 1521,
            tns: "NOVA".to_string(),
            schema: "SIEBEL".to_string(),
            login: "reader".to_string(),
            password: "pw".to_string(),
        };
        let mut builder = ProfileBuilder::start(datasource, "2026-01-01-00-00-00");
        builder.push_table(table);
        builder.seal("2026-01-01-00-00-01", true)
    }

    #[test]
    fn table_params_cover_identity_and_keys() {
        let doc = document(TableProfile::declared("S_ORG", Some("ROW_ID".to_string()), None));
        let params = JobParams::for_table(&doc, &doc.tables()[0]);

        assert_eq!(params.source_name(), "SIEBEL_NOVA");
        assert_eq!(params.schema(), "SIEBEL");
        assert_eq!(params.value("merge_column"), Some("ROW_ID"));
        assert_eq!(params.value("check_column"), None);
        assert!(params.contains("check_column"));
        let values = params.template_values();
        assert_eq!(values.get("check_column").map(String::as_str), Some(""));
        assert!(!values.contains_key("prefix"));
        assert_eq!(params.value("reconcile"), Some("merge"));
        assert_eq!(params.value("direct"), Some("true"));
        assert_eq!(params.value("mapper"), Some("2"));
    }

    #[test]
    fn identity_overrides_are_refused() {
        let doc = document(TableProfile::declared("T1", None, None));
        let mut params = JobParams::for_table(&doc, &doc.tables()[0]);

        assert!(!params.apply_override("table", "OTHER"));
        assert!(params.apply_override("field_delimiter", "|"));
        assert_eq!(params.table(), "T1");
        assert_eq!(params.override_keys(), ["field_delimiter".to_string()]);
        assert_eq!(params.value("reconcile"), Some("append"));
    }
}

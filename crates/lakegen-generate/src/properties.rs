use lakegen_config::PropertyDefault;

use crate::naming::default_app_name;
use crate::params::JobParams;
use crate::template::{TemplateError, ValueTemplates};

pub const APP_NAME_KEY: &str = "appName";

/// Ordered, immutable Oozie property mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertySet {
    entries: Vec<(String, String)>,
}

impl PropertySet {
    /// Build the job properties from the declared template.
    ///
    /// Template keys keep their declared order. A key known to `params`
    /// takes the param value; otherwise the default is rendered against
    /// `params`. Override keys outside the template follow, then `appName`.
    pub fn build(
        defaults: &[PropertyDefault],
        params: &JobParams,
        workflow: &str,
        templates: &ValueTemplates<'_>,
    ) -> Result<Self, TemplateError> {
        let mut entries: Vec<(String, String)> = Vec::with_capacity(defaults.len() + 1);
        let values = params.template_values();

        for default in defaults {
            let value = if params.contains(&default.key) {
                params.rendered(&default.key)
            } else {
                match &default.value {
                    Some(template) => templates.render(template, &values)?,
                    None => String::new(),
                }
            };
            entries.push((default.key.clone(), value));
        }

        for key in params.override_keys() {
            if key != APP_NAME_KEY && !entries.iter().any(|(existing, _)| existing == key) {
                entries.push((key.clone(), params.rendered(key)));
            }
        }

        if !entries.iter().any(|(key, _)| key == APP_NAME_KEY) {
            let app_name = match params.value(APP_NAME_KEY) {
                Some(app_name) => app_name.to_string(),
                None => default_app_name(workflow, params.source_name(), params.schema(), params.table()),
            };
            entries.push((APP_NAME_KEY.to_string(), app_name));
        }

        Ok(Self { entries })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `key=value` lines joined by newlines, without a trailing newline.
    pub fn render(&self) -> String {
        self.iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use lakegen_config::database_property_template;
    use lakegen_core::{DataSource, ProfileBuilder, TableProfile};

    use super::*;

    fn params() -> JobParams {
        let datasource = DataSource {
            name: "DS1".to_string(),
            ip: "10.0.0.1".to_string(),
            port: 1521,
            tns: "ORCL".to_string(),
            schema: "SCHEMA".to_string(),
            login: "reader".to_string(),
            password: "pw".to_string(),
        };
        let mut builder = ProfileBuilder::start(datasource, "2026-01-01-00-00-00");
        builder.push_table(TableProfile::declared("T1", Some("ID".to_string()), None));
        let doc = builder.seal("2026-01-01-00-00-01", false);
        let mut params = JobParams::for_table(&doc, &doc.tables()[0]);
        params.set("prefix", Some("/user/trace".to_string()));
        params.set("targetdb", Some("DS1_DEV".to_string()));
        params.set("wfpath", Some("/user/trace/workflows/ingest-full".to_string()));
        params
    }

    #[test]
    fn template_order_and_substitution() {
        let set = PropertySet::build(
            &database_property_template(),
            &params(),
            "ingest-full",
            &ValueTemplates::default(),
        )
            .expect("build properties");

        let keys: Vec<&str> = set.iter().map(|(key, _)| key).collect();
        assert_eq!(keys.first(), Some(&"resourceManager"));
        assert_eq!(keys.last(), Some(&"appName"));
        assert_eq!(set.get("jdbc_uri"), Some("jdbc:oracle:thin:@10.0.0.1:1521/ORCL"));
        assert_eq!(
            set.get("oozie.wf.application.path"),
            Some("/user/trace/workflows/ingest-full")
        );
        assert_eq!(set.get("merge_column"), Some("ID"));
        assert_eq!(set.get("check_column"), Some(""));
        assert_eq!(set.get("direct"), Some("false"));
        assert_eq!(set.get("backdate"), Some("7"));
        assert_eq!(set.get("appName"), Some("ingest-full-DS1-SCHEMA-T1"));
    }

    #[test]
    fn overrides_replace_or_append() {
        let mut params = params();
        params.apply_override("backdate", "30");
        params.apply_override("field_delimiter", "|");
        params.apply_override("appName", "custom");

        let set = PropertySet::build(
            &database_property_template(),
            &params,
            "ingest-full",
            &ValueTemplates::default(),
        )
            .expect("build properties");
        assert_eq!(set.get("backdate"), Some("30"));

        let tail: Vec<(&str, &str)> = set.iter().skip(set.len() - 2).collect();
        assert_eq!(tail, vec![("field_delimiter", "|"), ("appName", "custom")]);
    }

    #[test]
    fn rendering_has_no_trailing_newline() {
        let defaults = vec![
            PropertyDefault::new("schema", None),
            PropertyDefault::new("table", None),
        ];
        let set = PropertySet::build(&defaults, &params(), "wf", &ValueTemplates::default())
            .expect("build properties");
        assert_eq!(set.render(), "schema=SCHEMA\ntable=T1\nappName=wf-DS1-SCHEMA-T1");
    }

    #[test]
    fn unknown_placeholder_is_an_error() {
        let defaults = vec![PropertyDefault::new("queue", Some("{{ queue_name }}"))];
        let err = PropertySet::build(&defaults, &params(), "wf", &ValueTemplates::default())
            .unwrap_err();
        assert_eq!(err, TemplateError::MissingKey("queue_name".to_string()));
    }
}

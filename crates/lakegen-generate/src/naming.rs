//! Entity and artifact path naming.
//!
//! Feed names keep word boundaries by turning `_` into `-`, while process and
//! workflow names drop `_` entirely. Downstream schedulers key on both forms,
//! so the two rules must not be unified.

/// Falcon feed entity name.
pub fn feed_name(stage: &str, source: &str, schema: &str, table: &str, feed: &str) -> String {
    format!("{stage}-{source}-{schema}-{table}-{feed}").replace('_', "-")
}

/// Falcon process entity name.
pub fn process_name(stage: &str, source: &str, schema: &str, table: &str, workflow: &str) -> String {
    format!("{stage}-{source}-{schema}-{table}-{workflow}").replace('_', "")
}

/// Oozie workflow name derived from an application name.
pub fn workflow_name(app_name: &str) -> String {
    app_name.replace('_', "")
}

/// Default Oozie application name.
pub fn default_app_name(workflow: &str, source: &str, schema: &str, table: &str) -> String {
    format!("{workflow}-{source}-{schema}-{table}")
}

/// File stem shared by every per-table artifact.
pub fn artifact_stem(source: &str, schema: &str, table: &str) -> String {
    format!("{source}-{schema}-{table}")
}

pub fn oozie_dir(stage: &str, workflow: &str) -> String {
    format!("artifacts/{stage}-oozie-{workflow}")
}

pub fn falcon_process_dir(stage: &str, workflow: &str) -> String {
    format!("artifacts/{stage}-falconprocess-{workflow}")
}

pub fn falcon_feed_dir(stage: &str, feed: &str) -> String {
    format!("artifacts/{stage}-falconfeed-{feed}")
}

/// Hive staging table name: `<source>_<schema>_<table>`.
pub fn staging_table(source: &str, schema: &str, table: &str) -> String {
    format!("{source}_{schema}_{table}")
}

/// Join a path onto a prefix with a single separator.
pub fn join_prefix(prefix: &str, rest: &str) -> String {
    if prefix.is_empty() {
        rest.to_string()
    } else if prefix.ends_with('/') {
        format!("{prefix}{rest}")
    } else {
        format!("{prefix}/{rest}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_and_process_names_differ_on_underscores() {
        assert_eq!(
            feed_name("dev", "SIEBEL_NOVA", "S_SCHEMA", "S_ORG", "full"),
            "dev-SIEBEL-NOVA-S-SCHEMA-S-ORG-full"
        );
        assert_eq!(
            process_name("dev", "SIEBEL_NOVA", "S_SCHEMA", "S_ORG", "ingest-full"),
            "dev-SIEBELNOVA-SSCHEMA-SORG-ingest-full"
        );
    }

    #[test]
    fn workflow_name_strips_underscores() {
        assert_eq!(workflow_name("ingest-full-CPC-CPC_OWNER-T_1"), "ingest-full-CPC-CPCOWNER-T1");
    }

    #[test]
    fn join_prefix_avoids_double_separators() {
        assert_eq!(join_prefix("/user/trace", "workflows/wf"), "/user/trace/workflows/wf");
        assert_eq!(join_prefix("/user/trace/", "workflows/wf"), "/user/trace/workflows/wf");
        assert_eq!(join_prefix("", "workflows/wf"), "workflows/wf");
    }
}

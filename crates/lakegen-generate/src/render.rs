//! Text serialization of artifact records.
//!
//! XML descriptors and DDL come from the jinja templates under `templates/`,
//! rendered from the serialized artifact specs.

use std::sync::OnceLock;

use minijinja::Environment;
use serde::Serialize;

use crate::model::{
    Artifact, ArtifactKind, FalconFeedSpec, FalconHiveFeedSpec, FalconProcessSpec, HiveDdlSpec,
    OozieJobSpec,
};
use crate::template::{base_environment, TemplateError};

const FALCON_PROCESS: &str = "falconprocess.xml.j2";
const FALCON_FEED: &str = "falconfeed.xml.j2";
const FALCON_HIVE_FEED: &str = "falconhivefeed.xml.j2";
const HIVE_DDL: &str = "hive.sql.j2";

const TEMPLATES: [(&str, &str); 4] = [
    (FALCON_PROCESS, include_str!("../templates/falconprocess.xml.j2")),
    (FALCON_FEED, include_str!("../templates/falconfeed.xml.j2")),
    (FALCON_HIVE_FEED, include_str!("../templates/falconhivefeed.xml.j2")),
    (HIVE_DDL, include_str!("../templates/hive.sql.j2")),
];

static ENVIRONMENT: OnceLock<Result<Environment<'static>, TemplateError>> = OnceLock::new();

fn build_environment() -> Result<Environment<'static>, TemplateError> {
    let mut env = base_environment();
    for (name, source) in TEMPLATES {
        env.add_template(name, source)
            .map_err(|err| TemplateError::syntax(name, err))?;
    }
    Ok(env)
}

fn environment() -> Result<&'static Environment<'static>, TemplateError> {
    ENVIRONMENT
        .get_or_init(build_environment)
        .as_ref()
        .map_err(|err| err.clone())
}

fn render_template<S: Serialize>(name: &str, spec: &S) -> Result<String, TemplateError> {
    let template = environment()?
        .get_template(name)
        .map_err(|err| TemplateError::syntax(name, err))?;
    template
        .render(spec)
        .map_err(|err| TemplateError::render(name, err))
}

impl Artifact {
    pub fn render(&self) -> Result<String, TemplateError> {
        match &self.kind {
            ArtifactKind::OozieJob(spec) => Ok(render_oozie_job(spec)),
            ArtifactKind::FalconProcess(spec) => render_falcon_process(spec),
            ArtifactKind::FalconFeed(spec) => render_falcon_feed(spec),
            ArtifactKind::FalconHiveFeed(spec) => render_falcon_hive_feed(spec),
        }
    }
}

pub fn render_oozie_job(spec: &OozieJobSpec) -> String {
    spec.properties.render()
}

pub fn render_falcon_process(spec: &FalconProcessSpec) -> Result<String, TemplateError> {
    render_template(FALCON_PROCESS, spec)
}

pub fn render_falcon_feed(spec: &FalconFeedSpec) -> Result<String, TemplateError> {
    render_template(FALCON_FEED, spec)
}

/// Feed whose instances are partitions of a Hive table.
pub fn render_falcon_hive_feed(spec: &FalconHiveFeedSpec) -> Result<String, TemplateError> {
    render_template(FALCON_HIVE_FEED, spec)
}

/// `DROP` + `CREATE EXTERNAL TABLE` for one staging table.
pub fn render_ddl(spec: &HiveDdlSpec) -> Result<String, TemplateError> {
    render_template(HIVE_DDL, spec)
}

/// All DDL statements joined by newlines.
pub fn render_ddl_script(specs: &[HiveDdlSpec]) -> Result<String, TemplateError> {
    let statements = specs
        .iter()
        .map(render_ddl)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(statements.join("\n"))
}

#[cfg(test)]
mod tests {
    use quick_xml::events::Event;
    use quick_xml::Reader;

    use lakegen_config::RetryPolicy;

    use super::*;
    use crate::model::{FeedAcl, FeedInput, FeedOutput};

    fn assert_well_formed(xml: &str) {
        let mut reader = Reader::from_str(xml);
        let mut depth = 0i32;
        loop {
            match reader.read_event() {
                Ok(Event::Start(_)) => depth += 1,
                Ok(Event::End(_)) => depth -= 1,
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(err) => panic!("malformed xml: {err}\n{xml}"),
            }
        }
        assert_eq!(depth, 0, "unbalanced xml:\n{xml}");
    }

    fn process() -> FalconProcessSpec {
        FalconProcessSpec {
            name: "dev-DS1-SCHEMA-T1-ingest-full".to_string(),
            stage: "dev".to_string(),
            source_name: "DS1".to_string(),
            schema: "SCHEMA".to_string(),
            table: "T1".to_string(),
            workflow: "ingest-full".to_string(),
            cluster: "datalake".to_string(),
            validity_start: "2026-03-10T19:01Z".to_string(),
            validity_end: "2099-12-31T00:00Z".to_string(),
            frequency_hours: 24,
            timezone: "GMT+08:00".to_string(),
            inputs: vec![FeedInput {
                name: "input0".to_string(),
                feed: "dev-DS1-SCHEMA-T1-full".to_string(),
                start: "today(8,0)".to_string(),
                end: "today(9,30)".to_string(),
            }],
            outputs: vec![FeedOutput {
                name: "output0".to_string(),
                feed: "dev-DS1-SCHEMA-T1-full-retention".to_string(),
                instance: "today(8,0)".to_string(),
            }],
            properties: vec![
                ("prefix".to_string(), "/user/trace".to_string()),
                ("field_delimiter".to_string(), "<&>".to_string()),
            ],
            workflow_name: "ingest-full-DS1-SCHEMA-T1".to_string(),
            workflow_path: "/user/trace/workflows/ingest-full".to_string(),
            retry: RetryPolicy::default(),
        }
    }

    #[test]
    fn process_xml_is_well_formed_and_escaped() {
        let xml = render_falcon_process(&process()).expect("render process");
        assert_well_formed(&xml);
        assert!(xml.contains("<property name=\"field_delimiter\" value=\"&lt;&amp;&gt;\"/>"));
        assert!(xml.contains("<frequency>hours(24)</frequency>"));
        assert!(xml.contains(
            "<input name=\"input0\" feed=\"dev-DS1-SCHEMA-T1-full\" start=\"today(8,0)\" end=\"today(9,30)\"/>"
        ));
        assert!(xml.contains("<retry policy='periodic' delay='minutes(30)' attempts='3'/>"));
    }

    #[test]
    fn process_xml_layout() {
        let xml = render_falcon_process(&process()).expect("render process");
        assert!(xml.starts_with(
            "<process xmlns='uri:falcon:process:0.1' name=\"dev-DS1-SCHEMA-T1-ingest-full\">\n    <tags>"
        ));
        assert!(xml.contains(
            "    <inputs>\n        <input name=\"input0\" feed=\"dev-DS1-SCHEMA-T1-full\" start=\"today(8,0)\" end=\"today(9,30)\"/>\n    </inputs>\n"
        ));
        assert!(xml.contains(
            "        <property name=\"oozie.processing.timezone\" value=\"UTC\" />\n    </properties>\n"
        ));
        assert!(xml.ends_with("</process>\n"));
        assert!(!xml.contains("\n\n"));
    }

    #[test]
    fn process_without_feeds_omits_blocks() {
        let mut spec = process();
        spec.inputs.clear();
        spec.outputs.clear();
        let xml = render_falcon_process(&spec).expect("render process");
        assert_well_formed(&xml);
        assert!(!xml.contains("<inputs>"));
        assert!(!xml.contains("<outputs>"));
    }

    #[test]
    fn feed_retention_is_optional() {
        let mut spec = FalconFeedSpec {
            name: "dev-DS1-SCHEMA-T1-full".to_string(),
            stage: "dev".to_string(),
            source_name: "DS1".to_string(),
            schema: "SCHEMA".to_string(),
            table: "T1".to_string(),
            feed: "full".to_string(),
            format: "parquet".to_string(),
            cluster: "datalake".to_string(),
            validity_start: "2026-03-09T16:00Z".to_string(),
            validity_end: "2099-12-31T00:00Z".to_string(),
            timezone: "GMT+08:00".to_string(),
            late_cutoff: "hours(18)".to_string(),
            retention_days: None,
            path: "/user/trace/source/DS1/SCHEMA_T1/instance_date=${YEAR}".to_string(),
            acl: FeedAcl {
                owner: "trace".to_string(),
                group: "users".to_string(),
                permission: "0x755".to_string(),
            },
            queue_name: "oozie".to_string(),
            job_priority: "NORMAL".to_string(),
        };

        let xml = render_falcon_feed(&spec).expect("render feed");
        assert_well_formed(&xml);
        assert!(!xml.contains("<retention"));
        assert_eq!(xml.matches("path='/user/trace/source/DS1/SCHEMA_T1/instance_date=${YEAR}'").count(), 2);

        spec.retention_days = Some(365);
        let xml = render_falcon_feed(&spec).expect("render feed");
        assert_well_formed(&xml);
        assert!(xml.contains("<retention limit='days(365)' action='delete'/>"));
    }

    #[test]
    fn hive_feed_points_at_table_partitions() {
        let spec = FalconHiveFeedSpec {
            name: "dev-DS1-SCHEMA-T1-hive-full".to_string(),
            stage: "dev".to_string(),
            source_name: "DS1".to_string(),
            schema: "SCHEMA".to_string(),
            table: "T1".to_string(),
            feed: "hive-full".to_string(),
            format: "orc".to_string(),
            cluster: "datalake".to_string(),
            validity_start: "2026-03-09T16:00Z".to_string(),
            validity_end: "2099-12-31T00:00Z".to_string(),
            timezone: "GMT+08:00".to_string(),
            late_cutoff: "hours(18)".to_string(),
            retention_days: Some(30),
            table_uri: "catalog:DS1_DEV:SCHEMA_T1#instance_date=${YEAR}-${MONTH}-${DAY}".to_string(),
            acl: FeedAcl {
                owner: "trace".to_string(),
                group: "users".to_string(),
                permission: "0x755".to_string(),
            },
            queue_name: "oozie".to_string(),
            job_priority: "NORMAL".to_string(),
        };

        let xml = render_falcon_hive_feed(&spec).expect("render hive feed");
        assert_well_formed(&xml);
        assert!(xml.contains("entity_type=feed,format=orc,stage=dev"));
        assert_eq!(
            xml.matches("<table uri='catalog:DS1_DEV:SCHEMA_T1#instance_date=${YEAR}-${MONTH}-${DAY}'/>")
                .count(),
            2
        );
        assert!(xml.contains("<retention limit='days(30)' action='delete'/>"));
        assert!(!xml.contains("<locations>"));
    }

    #[test]
    fn ddl_statement_shape() {
        let spec = HiveDdlSpec {
            stage: "prod".to_string(),
            database: "staging".to_string(),
            table: "DS1_SCHEMA_T1".to_string(),
            columns: vec![
                ("ID".to_string(), "STRING".to_string()),
                ("LAST_UPD".to_string(), "STRING".to_string()),
            ],
            location: "/user/trace/source/DS1/SCHEMA_T1/CURRENT".to_string(),
        };
        assert_eq!(
            render_ddl(&spec).expect("render ddl"),
            "DROP TABLE IF EXISTS staging.DS1_SCHEMA_T1;\n\
             CREATE EXTERNAL TABLE staging.DS1_SCHEMA_T1 (\n    `ID` STRING,\n    `LAST_UPD` STRING\n) \
             STORED AS PARQUET LOCATION '/user/trace/source/DS1/SCHEMA_T1/CURRENT';"
        );
        assert_eq!(render_ddl_script(&[]).expect("render script"), "");
        assert_eq!(
            render_ddl_script(&[spec.clone(), spec])
                .expect("render script")
                .matches("DROP TABLE")
                .count(),
            2
        );
    }
}

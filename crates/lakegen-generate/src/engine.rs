use std::time::Instant;

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use lakegen_config::{
    validate_config, ConfigModel, Feed, HiveFeed, Process, PropertyDefault, Stage,
};
use lakegen_core::{
    hive_type, incremental_mapper_count, mapper_count, Clock, ProfileDocument, TableProfile,
};

use crate::model::{
    Artifact, ArtifactKind, ArtifactSet, FalconFeedSpec, FalconHiveFeedSpec, FalconProcessSpec,
    FeedAcl, FeedInput, FeedOutput, GenerationIssue, GenerationOutput, GenerationReport,
    HiveDdlSpec, InputKind, OozieJobSpec,
};
use crate::naming::{
    artifact_stem, falcon_feed_dir, falcon_process_dir, feed_name, join_prefix, oozie_dir,
    process_name, staging_table, workflow_name,
};
use crate::params::{JobParams, IDENTITY_KEYS};
use crate::properties::{PropertySet, APP_NAME_KEY};
use crate::schedule::{utc_start, FEED_DAY_OFFSET, PROCESS_DAY_OFFSET};
use crate::template::ValueTemplates;

/// Turns profiled tables into scheduler artifacts.
///
/// Generation is a pure function of the documents, the config and the clock:
/// the same inputs always yield the same [`ArtifactSet`]. Problems scoped to
/// one table, stage and process or feed become report issues and only skip
/// that combination.
pub struct ArtifactGenerator<'a> {
    config: &'a ConfigModel,
    clock: &'a dyn Clock,
    input: InputKind,
}

impl<'a> ArtifactGenerator<'a> {
    pub fn new(config: &'a ConfigModel, clock: &'a dyn Clock) -> Self {
        Self {
            config,
            clock,
            input: InputKind::Catalog,
        }
    }

    /// Select the property template matching the input source.
    pub fn with_input(mut self, input: InputKind) -> Self {
        self.input = input;
        self
    }

    fn property_template(&self) -> &'a [PropertyDefault] {
        match self.input {
            InputKind::Catalog => &self.config.oozie.defaults,
            InputKind::TableList => &self.config.oozie.file_defaults,
        }
    }

    pub fn generate(&self, documents: &[ProfileDocument]) -> GenerationOutput {
        let start = Instant::now();
        let (templates, template_failures) = ValueTemplates::for_config(self.config);
        let mut pass = Pass {
            generator: self,
            templates,
            now: self.clock.now(),
            artifacts: ArtifactSet::default(),
            report: GenerationReport::new(self.input),
        };

        info!(
            event = "generation_started",
            documents = documents.len(),
            stages = self.config.stage.len(),
            processes = self.config.process.len(),
            feeds = self.config.feed.len(),
            hive_feeds = self.config.hive_feed.len()
        );

        pass.check_config();
        for (path, err) in template_failures {
            pass.record(GenerationIssue::error(err.code(), err.to_string()).at_path(path));
        }
        for document in documents {
            pass.document(document);
        }

        let Pass {
            artifacts,
            mut report,
            ..
        } = pass;
        report.artifacts = artifacts.counts();
        match artifacts.fingerprint() {
            Ok(fingerprint) => report.fingerprint = fingerprint,
            Err(err) => {
                warn!(event = "render_failed", error = %err);
                report.record_issue(GenerationIssue::error(err.code(), err.to_string()));
            }
        }

        info!(
            event = "generation_finished",
            tables = report.tables,
            jobs = report.jobs_emitted,
            feeds = report.feeds_emitted,
            ddl = report.ddl_statements,
            issues = report.issues.len(),
            fingerprint = %report.fingerprint,
            elapsed_ms = start.elapsed().as_millis() as u64
        );

        GenerationOutput { artifacts, report }
    }
}

/// Mutable state of one generation pass.
struct Pass<'g, 'a> {
    generator: &'g ArtifactGenerator<'a>,
    templates: ValueTemplates<'a>,
    now: NaiveDateTime,
    artifacts: ArtifactSet,
    report: GenerationReport,
}

/// Identity of the table being processed, for issue scoping.
struct TableScope<'t> {
    source: &'t str,
    schema: &'t str,
    table: &'t TableProfile,
}

impl TableScope<'_> {
    fn issue(&self, issue: GenerationIssue) -> GenerationIssue {
        issue.for_table(self.source, self.schema, &self.table.table)
    }

    fn stem(&self) -> String {
        artifact_stem(self.source, self.schema, &self.table.table)
    }
}

impl<'a> Pass<'_, 'a> {
    fn config(&self) -> &'a ConfigModel {
        self.generator.config
    }

    fn record(&mut self, issue: GenerationIssue) {
        if issue.is_error() {
            warn!(event = "generation_issue", code = %issue.code, message = %issue.message);
        } else {
            debug!(event = "generation_warning", code = %issue.code, message = %issue.message);
        }
        self.report.record_issue(issue);
    }

    fn check_config(&mut self) {
        let validation = validate_config(self.config());
        for issue in validation.errors {
            self.record(GenerationIssue::error(&issue.code, issue.message).at_path(issue.path));
        }
        for issue in validation.warnings {
            self.record(GenerationIssue::warning(&issue.code, issue.message).at_path(issue.path));
        }
    }

    fn document(&mut self, document: &ProfileDocument) {
        self.report.documents += 1;
        let datasource = document.datasource();
        let source = datasource.source_name();

        if let Some(error) = document.error() {
            self.report.failed_documents += 1;
            let mut issue = GenerationIssue::warning(
                "source_failed",
                format!("source '{source}' was not profiled: {error}"),
            );
            issue.source = Some(source);
            self.record(issue);
            return;
        }

        for table in document.tables() {
            self.report.tables += 1;
            let scope = TableScope {
                source: &source,
                schema: &datasource.schema,
                table,
            };

            if let Err(err) = table.validate() {
                self.report.tables_rejected += 1;
                self.record(scope.issue(GenerationIssue::error("invalid_profile", err.to_string())));
                continue;
            }

            let base = JobParams::for_table(document, table);
            for (stage_name, stage) in &self.config().stage {
                self.stage(&scope, &base, stage_name, stage);
            }
        }
    }

    fn stage(&mut self, scope: &TableScope<'_>, base: &JobParams, stage_name: &str, stage: &Stage) {
        let mut params = base.clone();
        params.set("stage", Some(stage_name.to_string()));
        params.set("prefix", Some(stage.prefix.clone()));
        params.set("stagingdb", Some(stage.stagingdb.clone()));

        match self.templates.render(&stage.targetdb, &base.template_values()) {
            Ok(targetdb) => params.set("targetdb", Some(targetdb)),
            Err(err) => {
                self.record(
                    scope
                        .issue(GenerationIssue::error(err.code(), format!("targetdb: {err}")))
                        .in_stage(stage_name),
                );
                return;
            }
        }

        let overrides = self.overrides(scope, stage);
        for (key, _) in &overrides {
            if IDENTITY_KEYS.contains(&key.as_str()) {
                self.record(
                    scope
                        .issue(GenerationIssue::warning(
                            "identity_override_ignored",
                            format!("override of identity field '{key}' is ignored"),
                        ))
                        .in_stage(stage_name),
                );
            }
        }

        self.ddl(scope, &params, stage_name);

        for (process_key, process) in &self.config().process {
            let mut job = params.clone();
            self.process_fields(&mut job, scope.table, stage, process);
            apply_overrides(&mut job, &overrides);
            self.process(scope, &job, stage_name, process_key, process);
        }

        let mut feed_params = params;
        apply_overrides(&mut feed_params, &overrides);
        for (feed_key, feed) in &self.config().feed {
            self.feed(scope, &feed_params, stage_name, feed_key, feed);
        }
        for (feed_key, feed) in &self.config().hive_feed {
            self.hive_feed(scope, &feed_params, stage_name, feed_key, feed);
        }
    }

    /// Stage properties first, then matching table overrides.
    fn overrides(&self, scope: &TableScope<'_>, stage: &Stage) -> Vec<(String, String)> {
        let mut overrides: Vec<(String, String)> = stage
            .properties
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        for table_override in &self.config().table_override {
            if table_override.matches(scope.source, scope.schema, &scope.table.table) {
                overrides.extend(
                    table_override
                        .properties
                        .iter()
                        .map(|(key, value)| (key.clone(), value.clone())),
                );
            }
        }
        overrides
    }

    fn process_fields(&self, job: &mut JobParams, table: &TableProfile, stage: &Stage, process: &Process) {
        job.set("workflow", Some(process.workflow.clone()));
        job.set(
            "wfpath",
            Some(join_prefix(&stage.prefix, &format!("workflows/{}", process.workflow))),
        );
        if process.incremental {
            let mappers = incremental_mapper_count(mapper_count(table.estimated_size));
            job.set("mapper", Some(mappers.to_string()));
        }
    }

    fn process(
        &mut self,
        scope: &TableScope<'_>,
        job: &JobParams,
        stage_name: &str,
        process_key: &str,
        process: &Process,
    ) {
        let scoped = |issue: GenerationIssue| {
            scope.issue(issue).in_stage(stage_name).in_process(process_key)
        };

        if !process.condition.evaluate(job) {
            self.report.jobs_skipped_by_condition += 1;
            debug!(
                event = "condition_not_met",
                stage = stage_name,
                process = process_key,
                table = %scope.table.table
            );
            return;
        }

        let properties = match PropertySet::build(
            self.generator.property_template(),
            job,
            &process.workflow,
            &self.templates,
        ) {
            Ok(properties) => properties,
            Err(err) => {
                self.record(scoped(GenerationIssue::error(err.code(), err.to_string())));
                return;
            }
        };

        let config = self.config();
        let falcon = &config.falcon;
        let feed_ref = |feed: &str| feed_name(stage_name, scope.source, scope.schema, &scope.table.table, feed);

        let mut missing = Vec::new();
        for feed in process.in_feeds.iter().chain(process.out_feeds.iter()) {
            if !config.has_feed(feed) {
                missing.push(feed.clone());
            }
        }
        if !missing.is_empty() {
            for feed in missing {
                self.record(scoped(
                    GenerationIssue::error(
                        "unknown_feed",
                        format!("process '{process_key}' references undefined feed '{feed}'"),
                    )
                    .in_feed(&feed),
                ));
            }
            return;
        }

        let inputs = process
            .in_feeds
            .iter()
            .enumerate()
            .map(|(idx, feed)| FeedInput {
                name: format!("input{idx}"),
                feed: feed_ref(feed),
                start: falcon.input_start.clone(),
                end: falcon.input_end.clone(),
            })
            .collect();
        let outputs = process
            .out_feeds
            .iter()
            .enumerate()
            .map(|(idx, feed)| FeedOutput {
                name: format!("output{idx}"),
                feed: feed_ref(feed),
                instance: falcon.output_instance.clone(),
            })
            .collect();

        let exec_time = process.exec_time(scope.source);
        let Some(validity_start) =
            utc_start(self.now, exec_time, PROCESS_DAY_OFFSET, falcon.utc_offset_hours)
        else {
            self.record(scoped(GenerationIssue::error(
                "invalid_time",
                format!("'{exec_time}' is not a valid HH:MM time"),
            )));
            return;
        };

        let app_name = properties.get(APP_NAME_KEY).unwrap_or_default();
        let process_spec = FalconProcessSpec {
            name: process_name(
                stage_name,
                scope.source,
                scope.schema,
                &scope.table.table,
                &process.workflow,
            ),
            stage: stage_name.to_string(),
            source_name: scope.source.to_string(),
            schema: scope.schema.to_string(),
            table: scope.table.table.clone(),
            workflow: process.workflow.clone(),
            cluster: falcon.cluster.clone(),
            validity_start,
            validity_end: falcon.validity_end.clone(),
            frequency_hours: falcon.process_frequency_hours,
            timezone: falcon.timezone.clone(),
            inputs,
            outputs,
            properties: properties
                .iter()
                .filter(|(key, _)| !key.contains('.'))
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
            workflow_name: workflow_name(app_name),
            workflow_path: job.rendered("wfpath"),
            retry: falcon.retry.clone(),
        };

        let stem = scope.stem();
        let oozie = Artifact {
            path: format!("{}/{stem}.properties", oozie_dir(stage_name, &process.workflow)),
            kind: ArtifactKind::OozieJob(OozieJobSpec {
                stage: stage_name.to_string(),
                workflow: process.workflow.clone(),
                properties,
            }),
        };
        let descriptor = Artifact {
            path: format!("{}/{stem}.xml", falcon_process_dir(stage_name, &process.workflow)),
            kind: ArtifactKind::FalconProcess(process_spec),
        };

        let emitted = self.insert(oozie, &scoped);
        self.insert(descriptor, &scoped);
        if emitted {
            self.report.jobs_emitted += 1;
        }
    }

    fn feed(
        &mut self,
        scope: &TableScope<'_>,
        params: &JobParams,
        stage_name: &str,
        feed_key: &str,
        feed: &Feed,
    ) {
        let scoped = |issue: GenerationIssue| scope.issue(issue).in_stage(stage_name).in_feed(feed_key);
        let falcon = &self.config().falcon;

        let path = match self.templates.render(&feed.path, &params.template_values()) {
            Ok(path) => path,
            Err(err) => {
                self.record(scoped(GenerationIssue::error(err.code(), err.to_string())));
                return;
            }
        };
        let Some(validity_start) =
            utc_start(self.now, &feed.exec_time, FEED_DAY_OFFSET, falcon.utc_offset_hours)
        else {
            self.record(scoped(GenerationIssue::error(
                "invalid_time",
                format!("'{}' is not a valid HH:MM time", feed.exec_time),
            )));
            return;
        };

        let spec = FalconFeedSpec {
            name: feed_name(stage_name, scope.source, scope.schema, &scope.table.table, feed_key),
            stage: stage_name.to_string(),
            source_name: scope.source.to_string(),
            schema: scope.schema.to_string(),
            table: scope.table.table.clone(),
            feed: feed_key.to_string(),
            format: feed.format.clone(),
            cluster: falcon.cluster.clone(),
            validity_start,
            validity_end: falcon.validity_end.clone(),
            timezone: falcon.timezone.clone(),
            late_cutoff: falcon.late_cutoff.clone(),
            retention_days: feed.retention_days,
            path,
            acl: FeedAcl {
                owner: falcon.acl_owner.clone(),
                group: falcon.acl_group.clone(),
                permission: falcon.acl_permission.clone(),
            },
            queue_name: falcon.queue_name.clone(),
            job_priority: falcon.job_priority.clone(),
        };

        let artifact = Artifact {
            path: format!("{}/{}.xml", falcon_feed_dir(stage_name, feed_key), scope.stem()),
            kind: ArtifactKind::FalconFeed(spec),
        };
        if self.insert(artifact, &scoped) {
            self.report.feeds_emitted += 1;
        }
    }

    /// Hive-backed feed; its path renders to the table URI.
    fn hive_feed(
        &mut self,
        scope: &TableScope<'_>,
        params: &JobParams,
        stage_name: &str,
        feed_key: &str,
        feed: &HiveFeed,
    ) {
        let scoped = |issue: GenerationIssue| scope.issue(issue).in_stage(stage_name).in_feed(feed_key);
        let falcon = &self.config().falcon;

        let table_uri = match self.templates.render(&feed.path, &params.template_values()) {
            Ok(uri) => uri,
            Err(err) => {
                self.record(scoped(GenerationIssue::error(err.code(), err.to_string())));
                return;
            }
        };
        let Some(validity_start) =
            utc_start(self.now, &feed.exec_time, FEED_DAY_OFFSET, falcon.utc_offset_hours)
        else {
            self.record(scoped(GenerationIssue::error(
                "invalid_time",
                format!("'{}' is not a valid HH:MM time", feed.exec_time),
            )));
            return;
        };

        let spec = FalconHiveFeedSpec {
            name: feed_name(stage_name, scope.source, scope.schema, &scope.table.table, feed_key),
            stage: stage_name.to_string(),
            source_name: scope.source.to_string(),
            schema: scope.schema.to_string(),
            table: scope.table.table.clone(),
            feed: feed_key.to_string(),
            format: feed.format.clone(),
            cluster: falcon.cluster.clone(),
            validity_start,
            validity_end: falcon.validity_end.clone(),
            timezone: falcon.timezone.clone(),
            late_cutoff: falcon.late_cutoff.clone(),
            retention_days: feed.retention_days,
            table_uri,
            acl: FeedAcl {
                owner: falcon.acl_owner.clone(),
                group: falcon.acl_group.clone(),
                permission: falcon.acl_permission.clone(),
            },
            queue_name: falcon.queue_name.clone(),
            job_priority: falcon.job_priority.clone(),
        };

        let artifact = Artifact {
            path: format!("{}/{}.xml", falcon_feed_dir(stage_name, feed_key), scope.stem()),
            kind: ArtifactKind::FalconHiveFeed(spec),
        };
        if self.insert(artifact, &scoped) {
            self.report.feeds_emitted += 1;
        }
    }

    fn ddl(&mut self, scope: &TableScope<'_>, params: &JobParams, stage_name: &str) {
        let table = scope.table;
        if !self.config().ddl.applies(stage_name, scope.source, &table.table) {
            return;
        }
        if table.columns.is_empty() {
            self.record(
                scope
                    .issue(GenerationIssue::warning(
                        "ddl_skipped_no_columns",
                        "table has no known columns; staging DDL not emitted",
                    ))
                    .in_stage(stage_name),
            );
            return;
        }

        let prefix = params.rendered("prefix");
        self.artifacts.push_ddl(HiveDdlSpec {
            stage: stage_name.to_string(),
            database: params.rendered("stagingdb"),
            table: staging_table(scope.source, scope.schema, &table.table),
            columns: table
                .ordered_columns()
                .into_iter()
                .map(|col| (col.field.clone(), hive_type(&col.data_type).to_string()))
                .collect(),
            location: join_prefix(
                &prefix,
                &format!("source/{}/{}_{}/CURRENT", scope.source, scope.schema, table.table),
            ),
        });
        self.report.ddl_statements += 1;
    }

    /// Returns `false` when the path was already taken.
    fn insert<F>(&mut self, artifact: Artifact, scoped: &F) -> bool
    where
        F: Fn(GenerationIssue) -> GenerationIssue,
    {
        match self.artifacts.insert(artifact) {
            Ok(()) => true,
            Err(rejected) => {
                let issue = GenerationIssue::error(
                    "path_collision",
                    format!("artifact path '{}' is already used; keeping the first", rejected.path),
                )
                .at_path(rejected.path);
                self.record(scoped(issue));
                false
            }
        }
    }
}

fn apply_overrides(params: &mut JobParams, overrides: &[(String, String)]) {
    for (key, value) in overrides {
        params.apply_override(key, value);
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use lakegen_config::load_config;
    use lakegen_core::{Column, DataSource, FixedClock, ProfileBuilder};

    use super::*;

    fn clock() -> FixedClock {
        FixedClock(
            NaiveDate::from_ymd_opt(2026, 3, 10)
                .and_then(|date| date.and_hms_opt(12, 0, 0))
                .expect("valid date"),
        )
    }

    fn document(tables: Vec<TableProfile>) -> ProfileDocument {
        let datasource = DataSource {
            name: "DS1".to_string(),
            ip: "10.0.0.1".to_string(),
            port: 1521,
            tns: "ORCL".to_string(),
            schema: "SCHEMA".to_string(),
            login: "reader".to_string(),
            password: "pw".to_string(),
        };
        let mut builder = ProfileBuilder::start(datasource, "2026-03-10-11-00-00");
        for table in tables {
            builder.push_table(table);
        }
        builder.seal("2026-03-10-11-05-00", false)
    }

    #[test]
    fn invalid_profile_is_rejected_without_aborting() {
        let config = load_config(
            r#"
[stage.dev]
prefix = "/user/trace/development"

[process.ingest-full]
workflow = "ingest-full"
"#,
        )
        .expect("load config")
        .config;

        let mut broken = TableProfile::declared("BROKEN", None, None);
        broken.no_key = false;
        let mut good = TableProfile::declared("GOOD", None, None);
        good.columns.push(Column {
            field: "ID".to_string(),
            data_type: "NUMBER".to_string(),
            ordinal: 1,
            comment: None,
        });

        let clock = clock();
        let output = ArtifactGenerator::new(&config, &clock).generate(&[document(vec![broken, good])]);

        assert_eq!(output.report.tables, 2);
        assert_eq!(output.report.tables_rejected, 1);
        assert!(output.report.has_code("invalid_profile"));
        assert!(output
            .artifacts
            .contains("artifacts/dev-oozie-ingest-full/DS1-SCHEMA-GOOD.properties"));
    }

    #[test]
    fn incremental_processes_get_reduced_mappers() {
        let config = load_config(
            r#"
[stage.dev]
prefix = "/p"

[process.ingest-increment]
workflow = "ingest-increment"
incremental = true
"#,
        )
        .expect("load config")
        .config;

        let mut table = TableProfile::declared("BIG", Some("ID".to_string()), None);
        table.estimated_size = Some(3 * 1024 * 1024 * 1024);
        let clock = clock();
        let output = ArtifactGenerator::new(&config, &clock).generate(&[document(vec![table])]);

        let artifact = output
            .artifacts
            .get("artifacts/dev-oozie-ingest-increment/DS1-SCHEMA-BIG.properties")
            .expect("job emitted");
        let ArtifactKind::OozieJob(job) = &artifact.kind else {
            panic!("expected oozie job");
        };
        assert_eq!(job.properties.get("mapper"), Some("1"));
    }

    #[test]
    fn identity_overrides_are_reported_and_ignored() {
        let config = load_config(
            r#"
[stage.dev]
prefix = "/p"
properties = { table = "HIJACK", queue = "etl" }

[process.ingest-full]
workflow = "ingest-full"
"#,
        )
        .expect("load config")
        .config;

        let clock = clock();
        let output = ArtifactGenerator::new(&config, &clock)
            .generate(&[document(vec![TableProfile::declared("T1", None, None)])]);

        assert_eq!(output.report.issues_by_code.get("identity_override_ignored"), Some(&1));
        let artifact = output
            .artifacts
            .get("artifacts/dev-oozie-ingest-full/DS1-SCHEMA-T1.properties")
            .expect("job emitted");
        let ArtifactKind::OozieJob(job) = &artifact.kind else {
            panic!("expected oozie job");
        };
        assert_eq!(job.properties.get("table"), Some("T1"));
        assert_eq!(job.properties.get("queue"), Some("etl"));
    }

    #[test]
    fn hive_feeds_use_stage_target_database() {
        let config = load_config(
            r#"
[stage.dev]
prefix = "/p"
targetdb = "{{ source_name }}_DEV"

[process.transform-full]
workflow = "transform-full"
out_feeds = ["hive-full"]

[hive_feed.hive-full]
path = "catalog:{{ targetdb }}:{{ schema }}_{{ table }}#instance_date=${YEAR}-${MONTH}-${DAY}"
retention_days = 30
"#,
        )
        .expect("load config")
        .config;

        let clock = clock();
        let output = ArtifactGenerator::new(&config, &clock)
            .generate(&[document(vec![TableProfile::declared("T1", None, None)])]);

        assert_eq!(output.report.feeds_emitted, 1);
        assert_eq!(output.report.artifacts.get("falcon_hive_feed"), Some(&1));
        let artifact = output
            .artifacts
            .get("artifacts/dev-falconfeed-hive-full/DS1-SCHEMA-T1.xml")
            .expect("hive feed emitted");
        let ArtifactKind::FalconHiveFeed(feed) = &artifact.kind else {
            panic!("expected hive feed");
        };
        assert_eq!(feed.name, "dev-DS1-SCHEMA-T1-hive-full");
        assert_eq!(feed.format, "orc");
        assert_eq!(feed.table_uri, "catalog:DS1_DEV:SCHEMA_T1#instance_date=${YEAR}-${MONTH}-${DAY}");
        assert_eq!(feed.validity_start, "2026-03-09T16:00Z");

        let process = output
            .artifacts
            .get("artifacts/dev-falconprocess-transform-full/DS1-SCHEMA-T1.xml")
            .expect("process emitted")
            .render()
            .expect("render process");
        assert!(process.contains("feed=\"dev-DS1-SCHEMA-T1-hive-full\""));
    }

    #[test]
    fn malformed_config_template_is_reported_at_its_path() {
        let config = load_config(
            r#"
[stage.dev]
prefix = "/p"

[feed.full]
path = "{{ prefix }/source/{{ table }}"

[process.ingest-full]
workflow = "ingest-full"
in_feeds = ["full"]
"#,
        )
        .expect("load config")
        .config;

        let clock = clock();
        let output = ArtifactGenerator::new(&config, &clock)
            .generate(&[document(vec![TableProfile::declared("T1", None, None)])]);

        let located = output
            .report
            .issues
            .iter()
            .find(|issue| issue.path.as_deref() == Some("/feed/full/path"))
            .expect("compile failure located");
        assert_eq!(located.code, "invalid_template");
        assert_eq!(output.report.feeds_emitted, 0);
        assert!(output
            .artifacts
            .contains("artifacts/dev-oozie-ingest-full/DS1-SCHEMA-T1.properties"));
        assert_eq!(output.report.fingerprint.len(), 64);
    }
}

use std::collections::{BTreeMap, BTreeSet};

use lakegen_config::RetryPolicy;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::properties::PropertySet;
use crate::template::TemplateError;

/// Where the generator's tables came from; selects the property template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    /// Profiling documents produced from a live catalog.
    #[default]
    Catalog,
    /// A tab-separated table list.
    TableList,
}

/// One Oozie job properties file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OozieJobSpec {
    pub stage: String,
    pub workflow: String,
    pub properties: PropertySet,
}

/// Feed reference inside a process descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedInput {
    pub name: String,
    pub feed: String,
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedOutput {
    pub name: String,
    pub feed: String,
    pub instance: String,
}

/// Falcon process entity for one (table, stage, process).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FalconProcessSpec {
    pub name: String,
    pub stage: String,
    pub source_name: String,
    pub schema: String,
    pub table: String,
    pub workflow: String,
    pub cluster: String,
    pub validity_start: String,
    pub validity_end: String,
    pub frequency_hours: u32,
    pub timezone: String,
    pub inputs: Vec<FeedInput>,
    pub outputs: Vec<FeedOutput>,
    /// Job properties whose keys contain no `.`.
    pub properties: Vec<(String, String)>,
    pub workflow_name: String,
    pub workflow_path: String,
    pub retry: RetryPolicy,
}

/// Access control block of a feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedAcl {
    pub owner: String,
    pub group: String,
    pub permission: String,
}

/// Falcon feed entity for one (table, stage, feed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FalconFeedSpec {
    pub name: String,
    pub stage: String,
    pub source_name: String,
    pub schema: String,
    pub table: String,
    pub feed: String,
    pub format: String,
    pub cluster: String,
    pub validity_start: String,
    pub validity_end: String,
    pub timezone: String,
    pub late_cutoff: String,
    pub retention_days: Option<u32>,
    pub path: String,
    pub acl: FeedAcl,
    pub queue_name: String,
    pub job_priority: String,
}

/// Falcon feed entity backed by a Hive table, for one (table, stage, feed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FalconHiveFeedSpec {
    pub name: String,
    pub stage: String,
    pub source_name: String,
    pub schema: String,
    pub table: String,
    pub feed: String,
    pub format: String,
    pub cluster: String,
    pub validity_start: String,
    pub validity_end: String,
    pub timezone: String,
    pub late_cutoff: String,
    pub retention_days: Option<u32>,
    /// `catalog:<db>:<table>#<partition>` URI.
    pub table_uri: String,
    pub acl: FeedAcl,
    pub queue_name: String,
    pub job_priority: String,
}

/// External staging table definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HiveDdlSpec {
    pub stage: String,
    pub database: String,
    pub table: String,
    /// `(name, hive type)` in catalog order.
    pub columns: Vec<(String, String)>,
    pub location: String,
}

/// Content of one emitted file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactKind {
    OozieJob(OozieJobSpec),
    FalconProcess(FalconProcessSpec),
    FalconFeed(FalconFeedSpec),
    FalconHiveFeed(FalconHiveFeedSpec),
}

impl ArtifactKind {
    pub fn label(&self) -> &'static str {
        match self {
            ArtifactKind::OozieJob(_) => "oozie",
            ArtifactKind::FalconProcess(_) => "falcon_process",
            ArtifactKind::FalconFeed(_) => "falcon_feed",
            ArtifactKind::FalconHiveFeed(_) => "falcon_hive_feed",
        }
    }
}

/// A file artifact at a path relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: String,
    pub kind: ArtifactKind,
}

/// Name of the aggregated DDL script.
pub const DDL_FILE_NAME: &str = "hive-create.sql";

/// Every artifact of a generation run, keyed by unique relative path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactSet {
    files: Vec<Artifact>,
    ddl: Vec<HiveDdlSpec>,
    paths: BTreeSet<String>,
}

impl ArtifactSet {
    /// Add an artifact unless its path is taken; the rejected artifact is
    /// handed back.
    pub fn insert(&mut self, artifact: Artifact) -> Result<(), Artifact> {
        if artifact.path == DDL_FILE_NAME || self.paths.contains(&artifact.path) {
            return Err(artifact);
        }
        self.paths.insert(artifact.path.clone());
        self.files.push(artifact);
        Ok(())
    }

    pub fn push_ddl(&mut self, ddl: HiveDdlSpec) {
        self.ddl.push(ddl);
    }

    pub fn files(&self) -> &[Artifact] {
        &self.files
    }

    pub fn ddl(&self) -> &[HiveDdlSpec] {
        &self.ddl
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn get(&self, path: &str) -> Option<&Artifact> {
        self.files.iter().find(|artifact| artifact.path == path)
    }

    /// `(path, text)` for every file to write, DDL script last.
    pub fn rendered(&self) -> Result<Vec<(String, String)>, TemplateError> {
        let mut out = Vec::with_capacity(self.files.len() + 1);
        for artifact in &self.files {
            out.push((artifact.path.clone(), artifact.render()?));
        }
        out.push((
            DDL_FILE_NAME.to_string(),
            crate::render::render_ddl_script(&self.ddl)?,
        ));
        Ok(out)
    }

    /// SHA-256 over every path and rendered text, hex encoded.
    pub fn fingerprint(&self) -> Result<String, TemplateError> {
        let mut hasher = Sha256::new();
        for (path, text) in self.rendered()? {
            hasher.update(path.as_bytes());
            hasher.update([0u8]);
            hasher.update(text.as_bytes());
            hasher.update([0u8]);
        }
        Ok(hex::encode(hasher.finalize()))
    }

    /// Artifact counts by kind.
    pub fn counts(&self) -> BTreeMap<String, u64> {
        let mut counts = BTreeMap::new();
        for artifact in &self.files {
            *counts.entry(artifact.kind.label().to_string()).or_insert(0) += 1;
        }
        if !self.ddl.is_empty() {
            counts.insert("hive_ddl".to_string(), self.ddl.len() as u64);
        }
        counts
    }
}

/// Structured generation issue scoped to the entity it concerns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationIssue {
    pub level: String,
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl GenerationIssue {
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Self::new("error", code, message)
    }

    pub fn warning(code: &str, message: impl Into<String>) -> Self {
        Self::new("warning", code, message)
    }

    fn new(level: &str, code: &str, message: impl Into<String>) -> Self {
        Self {
            level: level.to_string(),
            code: code.to_string(),
            message: message.into(),
            source: None,
            schema: None,
            table: None,
            stage: None,
            process: None,
            feed: None,
            path: None,
        }
    }

    pub fn for_table(mut self, source: &str, schema: &str, table: &str) -> Self {
        self.source = Some(source.to_string());
        self.schema = Some(schema.to_string());
        self.table = Some(table.to_string());
        self
    }

    pub fn in_stage(mut self, stage: &str) -> Self {
        self.stage = Some(stage.to_string());
        self
    }

    pub fn in_process(mut self, process: &str) -> Self {
        self.process = Some(process.to_string());
        self
    }

    pub fn in_feed(mut self, feed: &str) -> Self {
        self.feed = Some(feed.to_string());
        self
    }

    pub fn at_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == "error"
    }
}

/// Report for a generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub input: InputKind,
    pub documents: u64,
    pub failed_documents: u64,
    pub tables: u64,
    pub tables_rejected: u64,
    pub jobs_emitted: u64,
    pub jobs_skipped_by_condition: u64,
    pub feeds_emitted: u64,
    pub ddl_statements: u64,
    pub artifacts: BTreeMap<String, u64>,
    pub fingerprint: String,
    pub issues_by_code: BTreeMap<String, u64>,
    pub issues: Vec<GenerationIssue>,
}

impl GenerationReport {
    pub fn new(input: InputKind) -> Self {
        Self {
            input,
            ..Self::default()
        }
    }

    pub fn record_issue(&mut self, issue: GenerationIssue) {
        *self.issues_by_code.entry(issue.code.clone()).or_insert(0) += 1;
        self.issues.push(issue);
    }

    pub fn error_count(&self) -> usize {
        self.issues.iter().filter(|issue| issue.is_error()).count()
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.issues_by_code.contains_key(code)
    }
}

/// Everything a generation pass produces.
#[derive(Debug, Clone)]
pub struct GenerationOutput {
    pub artifacts: ArtifactSet,
    pub report: GenerationReport,
}

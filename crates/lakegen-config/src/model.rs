use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::condition::Condition;

/// Generator configuration: stages, processes, feeds and rendering settings.
///
/// Maps are keyed by entity name; iteration order is the sorted name order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ConfigModel {
    #[serde(default)]
    pub stage: BTreeMap<String, Stage>,
    #[serde(default)]
    pub process: BTreeMap<String, Process>,
    #[serde(default)]
    pub feed: BTreeMap<String, Feed>,
    /// Hive-table feeds; they share the feed name space and output layout.
    #[serde(default)]
    pub hive_feed: BTreeMap<String, HiveFeed>,
    #[serde(default)]
    pub oozie: OozieDefaults,
    #[serde(default)]
    pub falcon: FalconSettings,
    #[serde(default)]
    pub ddl: DdlPolicy,
    #[serde(default)]
    pub table_override: Vec<TableOverride>,
}

impl ConfigModel {
    /// Whether `name` is a declared feed or hive feed.
    pub fn has_feed(&self, name: &str) -> bool {
        self.feed.contains_key(name) || self.hive_feed.contains_key(name)
    }
}

/// Deployment environment (e.g. `dev`, `test`, `prod`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Stage {
    /// HDFS prefix, e.g. `/user/trace/development`.
    pub prefix: String,
    /// Target database template, e.g. `{{ source_name }}_DEV`.
    #[serde(default = "default_targetdb")]
    pub targetdb: String,
    #[serde(default = "default_stagingdb")]
    pub stagingdb: String,
    /// Extra Oozie property overrides for every job of this stage.
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

fn default_targetdb() -> String {
    "{{ source_name }}".to_string()
}

fn default_stagingdb() -> String {
    "staging".to_string()
}

/// Scheduled workflow instantiated per table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Process {
    /// Workflow id; also the suffix of process names and output directories.
    pub workflow: String,
    #[serde(default)]
    pub in_feeds: Vec<String>,
    #[serde(default)]
    pub out_feeds: Vec<String>,
    #[serde(default)]
    pub condition: Condition,
    /// Incremental workflows get the reduced mapper count.
    #[serde(default)]
    pub incremental: bool,
    /// Local start time (`HH:MM`) for sources without a schedule entry.
    #[serde(default = "default_process_time")]
    pub default_time: String,
    /// Per-source local start time (`HH:MM`), keyed by source name.
    #[serde(default)]
    pub schedule: BTreeMap<String, String>,
}

pub const DEFAULT_PROCESS_TIME: &str = "03:01";

fn default_process_time() -> String {
    DEFAULT_PROCESS_TIME.to_string()
}

impl Process {
    /// Local start time for a source.
    pub fn exec_time(&self, source_name: &str) -> &str {
        self.schedule
            .get(source_name)
            .map(String::as_str)
            .unwrap_or(&self.default_time)
    }
}

/// Dataset descriptor instantiated per table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Feed {
    /// Location template rendered against the job values, e.g.
    /// `{{ prefix }}/source/{{ source_name }}`; `${YEAR}`-style macros are kept.
    pub path: String,
    #[serde(default = "default_feed_format")]
    pub format: String,
    #[serde(default = "default_feed_time")]
    pub exec_time: String,
    #[serde(default)]
    pub retention_days: Option<u32>,
}

/// Hive-table dataset descriptor instantiated per table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct HiveFeed {
    /// Catalog table URI template, e.g.
    /// `catalog:{{ targetdb }}:{{ table }}#instance_date=${YEAR}-${MONTH}-${DAY}`.
    pub path: String,
    #[serde(default = "default_hive_feed_format")]
    pub format: String,
    #[serde(default = "default_feed_time")]
    pub exec_time: String,
    #[serde(default)]
    pub retention_days: Option<u32>,
}

fn default_hive_feed_format() -> String {
    "orc".to_string()
}

fn default_feed_format() -> String {
    "parquet".to_string()
}

fn default_feed_time() -> String {
    "00:00".to_string()
}

/// One entry of the ordered Oozie property template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct PropertyDefault {
    pub key: String,
    /// Default value; may contain `{{ placeholder }}`s. Absent means "filled per table".
    #[serde(default)]
    pub value: Option<String>,
}

impl PropertyDefault {
    pub fn new(key: &str, value: Option<&str>) -> Self {
        Self {
            key: key.to_string(),
            value: value.map(str::to_string),
        }
    }
}

/// Ordered Oozie property templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct OozieDefaults {
    /// Template for catalog-profiled tables.
    #[serde(default = "database_property_template")]
    pub defaults: Vec<PropertyDefault>,
    /// Template for tables read from a table list.
    #[serde(default = "file_property_template")]
    pub file_defaults: Vec<PropertyDefault>,
}

impl Default for OozieDefaults {
    fn default() -> Self {
        Self {
            defaults: database_property_template(),
            file_defaults: file_property_template(),
        }
    }
}

/// Built-in template for database ingestion jobs.
pub fn database_property_template() -> Vec<PropertyDefault> {
    [
        ("resourceManager", Some("localhost:8050")),
        ("jobTracker", Some("localhost:8050")),
        ("nameNode", Some("hdfs://localhost:8020")),
        ("oozie.wf.application.path", Some("{{ wfpath }}")),
        ("oozie.use.system.libpath", Some("true")),
        ("prefix", None),
        ("jdbc_uri", Some("jdbc:oracle:thin:@{{ host }}:{{ port }}/{{ tns }}")),
        ("username", None),
        ("password", None),
        ("source_name", None),
        ("direct", None),
        ("targetdb", None),
        ("backdate", Some("7")),
        ("schema", None),
        ("table", None),
        ("mapper", None),
        ("split_by", None),
        ("merge_column", None),
        ("check_column", None),
        ("columns_java", None),
    ]
    .into_iter()
    .map(|(key, value)| PropertyDefault::new(key, value))
    .collect()
}

/// Built-in template for table-list (file) ingestion jobs.
pub fn file_property_template() -> Vec<PropertyDefault> {
    [
        ("resourceManager", Some("localhost:8050")),
        ("jobTracker", Some("localhost:8050")),
        ("nameNode", Some("hdfs://localhost:8020")),
        ("oozie.wf.application.path", Some("{{ wfpath }}")),
        ("oozie.use.system.libpath", Some("true")),
        ("prefix", None),
        ("source_name", None),
        ("targetdb", None),
        ("stagingdb", None),
        ("schema", None),
        ("table", None),
        ("merge_column", None),
        ("check_column", None),
        ("reconcile", Some("merge")),
    ]
    .into_iter()
    .map(|(key, value)| PropertyDefault::new(key, value))
    .collect()
}

/// Falcon rendering settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct FalconSettings {
    pub cluster: String,
    /// Timezone label written into descriptors.
    pub timezone: String,
    /// Hours subtracted from local schedule times to obtain UTC.
    pub utc_offset_hours: i64,
    pub validity_end: String,
    pub process_frequency_hours: u32,
    pub input_start: String,
    pub input_end: String,
    pub output_instance: String,
    pub retry: RetryPolicy,
    pub late_cutoff: String,
    pub acl_owner: String,
    pub acl_group: String,
    pub acl_permission: String,
    pub queue_name: String,
    pub job_priority: String,
}

impl Default for FalconSettings {
    fn default() -> Self {
        Self {
            cluster: "datalake".to_string(),
            timezone: "GMT+08:00".to_string(),
            utc_offset_hours: 8,
            validity_end: "2099-12-31T00:00Z".to_string(),
            process_frequency_hours: 24,
            input_start: "today(8,0)".to_string(),
            input_end: "today(9,30)".to_string(),
            output_instance: "today(8,0)".to_string(),
            retry: RetryPolicy::default(),
            late_cutoff: "hours(18)".to_string(),
            acl_owner: "trace".to_string(),
            acl_group: "users".to_string(),
            acl_permission: "0x755".to_string(),
            queue_name: "oozie".to_string(),
            job_priority: "NORMAL".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct RetryPolicy {
    pub policy: String,
    pub delay: String,
    pub attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            policy: "periodic".to_string(),
            delay: "minutes(30)".to_string(),
            attempts: 3,
        }
    }
}

/// Which stages receive staging-table DDL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct DdlPolicy {
    pub stages: Vec<String>,
    /// Extra `(stage, source, table)` triples that also get DDL.
    pub include: Vec<DdlInclusion>,
}

impl Default for DdlPolicy {
    fn default() -> Self {
        Self {
            stages: vec!["prod".to_string()],
            include: Vec::new(),
        }
    }
}

impl DdlPolicy {
    pub fn applies(&self, stage: &str, source_name: &str, table: &str) -> bool {
        self.stages.iter().any(|s| s == stage)
            || self.include.iter().any(|inc| {
                inc.stage == stage && inc.source == source_name && inc.table == table
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DdlInclusion {
    pub stage: String,
    pub source: String,
    pub table: String,
}

/// Per-table Oozie property overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct TableOverride {
    pub source: String,
    #[serde(default)]
    pub schema: Option<String>,
    pub table: String,
    pub properties: BTreeMap<String, String>,
}

impl TableOverride {
    pub fn matches(&self, source_name: &str, schema: &str, table: &str) -> bool {
        self.source == source_name
            && self.table == table
            && self.schema.as_deref().is_none_or(|s| s == schema)
    }
}

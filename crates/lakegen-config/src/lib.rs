//! Generator configuration: model, JSON Schema and validation.

pub mod condition;
pub mod errors;
pub mod model;
pub mod schema;
pub mod validate;

pub use condition::{Condition, ConditionContext, ConditionField};
pub use errors::{ConfigError, IssueSeverity, Result, ValidationIssue, ValidationReport};
pub use model::{
    database_property_template, file_property_template, ConfigModel, DdlInclusion, DdlPolicy,
    FalconSettings, Feed, HiveFeed, OozieDefaults, Process, PropertyDefault, RetryPolicy, Stage,
    TableOverride, DEFAULT_PROCESS_TIME,
};
pub use schema::config_json_schema;
pub use validate::{
    is_valid_hhmm, load_config, load_config_file, parse_config, parse_config_file, validate_config,
    validate_config_json, ValidatedConfig,
};

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use jsonschema::JSONSchema;
use serde_json::Value;

use crate::errors::{ConfigError, Result, ValidationIssue, ValidationReport};
use crate::model::ConfigModel;
use crate::schema::config_json_schema;

/// Loaded config with its referential findings.
///
/// [`load_config`] only returns configs without `errors`; [`parse_config`]
/// keeps them so that generation can scope each one to the artifacts it
/// affects.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub config: ConfigModel,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

/// Validate a config JSON document against the config JSON Schema.
pub fn validate_config_json(config_json: &Value, config_schema: &Value) -> Result<ValidationReport> {
    let compiled =
        JSONSchema::compile(config_schema).map_err(|err| ConfigError::Schema(err.to_string()))?;

    let mut report = ValidationReport::default();
    if let Err(errors) = compiled.validate(config_json) {
        for error in errors {
            let path = normalized_json_pointer(&error.instance_path.to_string());
            report.push_error(ValidationIssue::error(
                "schema_violation",
                path,
                error.to_string(),
                None,
            ));
        }
    }

    Ok(report)
}

/// Parse and structurally validate a TOML config.
///
/// Referential findings (unknown feeds, bad times, ...) are collected in the
/// returned config instead of rejecting it.
pub fn parse_config(text: &str) -> Result<ValidatedConfig> {
    let toml_value: toml::Value = toml::from_str(text)?;
    let config_json = serde_json::to_value(toml_value)?;
    let config_schema = serde_json::to_value(config_json_schema())?;

    let structural = validate_config_json(&config_json, &config_schema)?;
    if !structural.is_ok() {
        return Err(ConfigError::Invalid(structural));
    }

    let config: ConfigModel = serde_json::from_value(config_json)?;
    let report = validate_config(&config);

    tracing::debug!(
        event = "config_loaded",
        stages = config.stage.len(),
        processes = config.process.len(),
        feeds = config.feed.len(),
        hive_feeds = config.hive_feed.len(),
        errors = report.errors.len(),
        warnings = report.warnings.len()
    );

    Ok(ValidatedConfig {
        config,
        errors: report.errors,
        warnings: report.warnings,
    })
}

/// Parse, structurally validate and referentially validate a TOML config.
///
/// Any referential error rejects the whole config.
pub fn load_config(text: &str) -> Result<ValidatedConfig> {
    let parsed = parse_config(text)?;
    if !parsed.errors.is_empty() {
        return Err(ConfigError::Invalid(ValidationReport {
            errors: parsed.errors,
            warnings: parsed.warnings,
        }));
    }
    Ok(parsed)
}

pub fn load_config_file(path: &Path) -> Result<ValidatedConfig> {
    let text = std::fs::read_to_string(path)?;
    load_config(&text)
}

pub fn parse_config_file(path: &Path) -> Result<ValidatedConfig> {
    let text = std::fs::read_to_string(path)?;
    parse_config(&text)
}

/// Referential checks that the JSON Schema cannot express.
pub fn validate_config(config: &ConfigModel) -> ValidationReport {
    let mut report = ValidationReport::default();

    if config.stage.is_empty() {
        report.push_error(ValidationIssue::error(
            "no_stages",
            "/stage",
            "at least one stage must be defined",
            Some("add a [stage.<name>] table with a prefix".to_string()),
        ));
    }

    validate_processes(config, &mut report);
    validate_feeds(config, &mut report);
    validate_oozie(config, &mut report);
    validate_ddl(config, &mut report);

    report
}

fn validate_processes(config: &ConfigModel, report: &mut ValidationReport) {
    let mut workflows: BTreeMap<&str, &str> = BTreeMap::new();

    for (name, process) in &config.process {
        let base = format!("/process/{name}");

        if process.workflow.trim().is_empty() {
            report.push_error(ValidationIssue::error(
                "empty_workflow",
                format!("{base}/workflow"),
                format!("process '{name}' has an empty workflow id"),
                None,
            ));
        } else if let Some(previous) = workflows.insert(process.workflow.as_str(), name.as_str()) {
            report.push_error(ValidationIssue::error(
                "duplicate_workflow",
                format!("{base}/workflow"),
                format!(
                    "workflow '{}' is used by processes '{previous}' and '{name}'",
                    process.workflow
                ),
                Some("artifact directories are keyed by workflow id".to_string()),
            ));
        }

        for (field, feeds) in [("in_feeds", &process.in_feeds), ("out_feeds", &process.out_feeds)] {
            for (idx, feed) in feeds.iter().enumerate() {
                if !config.has_feed(feed) {
                    report.push_error(ValidationIssue::error(
                        "unknown_feed",
                        format!("{base}/{field}/{idx}"),
                        format!("process '{name}' references undefined feed '{feed}'"),
                        Some("declare it under [feed.<name>] or [hive_feed.<name>]".to_string()),
                    ));
                }
            }
        }

        if !is_valid_hhmm(&process.default_time) {
            push_bad_time(report, format!("{base}/default_time"), &process.default_time);
        }
        for (source, time) in &process.schedule {
            if !is_valid_hhmm(time) {
                push_bad_time(report, format!("{base}/schedule/{source}"), time);
            }
        }
    }
}

fn validate_feeds(config: &ConfigModel, report: &mut ValidationReport) {
    let referenced: BTreeSet<&str> = config
        .process
        .values()
        .flat_map(|process| process.in_feeds.iter().chain(process.out_feeds.iter()))
        .map(String::as_str)
        .collect();

    let feeds = config
        .feed
        .iter()
        .map(|(name, feed)| ("feed", name, &feed.path, &feed.exec_time))
        .chain(
            config
                .hive_feed
                .iter()
                .map(|(name, feed)| ("hive_feed", name, &feed.path, &feed.exec_time)),
        );

    for (section, name, path, exec_time) in feeds {
        let base = format!("/{section}/{name}");
        if !is_valid_hhmm(exec_time) {
            push_bad_time(report, format!("{base}/exec_time"), exec_time);
        }
        if path.trim().is_empty() {
            report.push_error(ValidationIssue::error(
                "empty_feed_path",
                format!("{base}/path"),
                format!("feed '{name}' has an empty path"),
                None,
            ));
        }
        if section == "hive_feed" && config.feed.contains_key(name) {
            report.push_error(ValidationIssue::error(
                "duplicate_feed",
                base.clone(),
                format!("'{name}' is declared both as a feed and as a hive feed"),
                Some("feed descriptors share the <stage>-falconfeed-<name> directory".to_string()),
            ));
        }
        if !referenced.contains(name.as_str()) {
            report.push_warning(ValidationIssue::warning(
                "unused_feed",
                base,
                format!("feed '{name}' is not referenced by any process"),
                None,
            ));
        }
    }
}

fn validate_oozie(config: &ConfigModel, report: &mut ValidationReport) {
    let templates = [
        ("defaults", &config.oozie.defaults),
        ("file_defaults", &config.oozie.file_defaults),
    ];
    for (field, template) in templates {
        let mut seen = BTreeSet::new();
        for (idx, entry) in template.iter().enumerate() {
            if !seen.insert(entry.key.as_str()) {
                report.push_error(ValidationIssue::error(
                    "duplicate_property",
                    format!("/oozie/{field}/{idx}/key"),
                    format!("property '{}' is declared twice", entry.key),
                    None,
                ));
            }
        }
    }
}

fn validate_ddl(config: &ConfigModel, report: &mut ValidationReport) {
    for (idx, stage) in config.ddl.stages.iter().enumerate() {
        if !config.stage.contains_key(stage) {
            report.push_warning(ValidationIssue::warning(
                "ddl_stage_undefined",
                format!("/ddl/stages/{idx}"),
                format!("DDL stage '{stage}' is not defined; no DDL will be emitted for it"),
                None,
            ));
        }
    }
    for (idx, inclusion) in config.ddl.include.iter().enumerate() {
        if !config.stage.contains_key(&inclusion.stage) {
            push_unknown_stage(report, format!("/ddl/include/{idx}/stage"), &inclusion.stage);
        }
    }
}

fn push_bad_time(report: &mut ValidationReport, path: String, value: &str) {
    report.push_error(ValidationIssue::error(
        "invalid_time",
        path,
        format!("'{value}' is not a valid HH:MM time"),
        None,
    ));
}

fn push_unknown_stage(report: &mut ValidationReport, path: String, stage: &str) {
    report.push_error(ValidationIssue::error(
        "unknown_stage",
        path,
        format!("DDL policy names undefined stage '{stage}'"),
        None,
    ));
}

/// `HH:MM` with `00 <= HH <= 23` and `00 <= MM <= 59`.
pub fn is_valid_hhmm(value: &str) -> bool {
    let Some((hours, minutes)) = value.split_once(':') else {
        return false;
    };
    let two_digits = |part: &str| part.len() == 2 && part.bytes().all(|b| b.is_ascii_digit());
    if !two_digits(hours) || !two_digits(minutes) {
        return false;
    }
    matches!((hours.parse::<u32>(), minutes.parse::<u32>()), (Ok(h), Ok(m)) if h < 24 && m < 60)
}

fn normalized_json_pointer(pointer: &str) -> String {
    if pointer.is_empty() {
        "/".to_string()
    } else {
        pointer.to_string()
    }
}

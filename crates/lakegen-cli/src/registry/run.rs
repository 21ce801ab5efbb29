use std::fs::{create_dir_all, OpenOptions};
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, Utc};
use serde::Serialize;

use lakegen_core::{ProfileDocument, ProfileMetrics, RedactedConnection};
use lakegen_generate::GenerationReport;

use super::{RegistryError, RegistryResult};

/// Serializable options of the command that started a run.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum RunOptions {
    Profile {
        config: PathBuf,
        max_attempts: u32,
        out: Option<PathBuf>,
    },
    Generate {
        config: PathBuf,
        input: PathBuf,
        input_kind: String,
        out_dir: PathBuf,
        clean: bool,
        strict: bool,
    },
}

/// Metadata captured at run start.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub run_dir: PathBuf,
    pub options: RunOptions,
    pub connections: Vec<RedactedConnection>,
}

/// JSON config written to each run directory.
#[derive(Debug, Serialize)]
pub struct RunConfig {
    pub run_id: String,
    pub started_at: String,
    pub tool_version: String,
    pub options: RunOptions,
    pub connections: Vec<RedactedConnection>,
    pub git: GitInfo,
}

/// Git metadata for reproducibility.
#[derive(Debug, Serialize)]
pub struct GitInfo {
    pub commit: Option<String>,
    pub dirty: Option<bool>,
}

/// Paths for run artifacts.
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub run_root: PathBuf,
    pub profiles_path: PathBuf,
    pub report_path: PathBuf,
    pub logs_path: PathBuf,
    pub metrics_path: PathBuf,
}

pub fn start_run(ctx: &RunContext) -> RegistryResult<RunPaths> {
    let timestamp = ctx.started_at.format("%Y-%m-%dT%H-%M-%SZ").to_string();
    let run_root = ctx
        .run_dir
        .join(format!("{timestamp}__run_{}", ctx.run_id));

    create_dir_all(&run_root)?;

    let config_path = run_root.join("config.json");
    let logs_path = run_root.join("logs.ndjson");

    let config = RunConfig {
        run_id: ctx.run_id.clone(),
        started_at: ctx.started_at.to_rfc3339(),
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        options: ctx.options.clone(),
        connections: ctx.connections.clone(),
        git: collect_git_info(),
    };

    write_json(&config_path, &config)?;

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&logs_path)?;

    Ok(RunPaths {
        profiles_path: run_root.join("profiles.json"),
        report_path: run_root.join("generation_report.json"),
        metrics_path: run_root.join("metrics.json"),
        logs_path,
        run_root,
    })
}

/// Persist profiling documents in the run directory and, optionally, at `out_path`.
pub fn write_profiles(
    paths: &RunPaths,
    documents: &[ProfileDocument],
    out_path: Option<&Path>,
) -> RegistryResult<()> {
    write_json(&paths.profiles_path, &documents)?;

    if let Some(out_path) = out_path {
        if let Some(parent) = out_path.parent() {
            if !parent.as_os_str().is_empty() {
                create_dir_all(parent)?;
            }
        }
        write_json(out_path, &documents)?;
    }

    Ok(())
}

pub fn write_generation_report(paths: &RunPaths, report: &GenerationReport) -> RegistryResult<()> {
    write_json(&paths.report_path, report)
}

pub fn write_metrics(paths: &RunPaths, metrics: &ProfileMetrics) -> RegistryResult<()> {
    write_json(&paths.metrics_path, metrics)
}

pub fn collect_git_info() -> GitInfo {
    let commit = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
            } else {
                None
            }
        })
        .filter(|value| !value.is_empty());

    let dirty = Command::new("git")
        .args(["status", "--porcelain"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| !output.stdout.is_empty());

    GitInfo { commit, dirty }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> RegistryResult<()> {
    let file = OpenOptions::new().create(true).truncate(true).write(true).open(path)?;
    serde_json::to_writer_pretty(file, value).map_err(RegistryError::from)
}

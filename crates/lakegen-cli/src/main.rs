mod profiler_config;
mod registry;

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use lakegen_config::{
    config_json_schema, load_config_file, parse_config_file, ConfigError, ValidatedConfig,
};
use lakegen_core::{
    collect_profile_metrics, profile_json_schema, Error as CoreError, SystemClock,
};
use lakegen_generate::{
    read_profile_file, read_table_list, ArtifactGenerator, ArtifactWriter, GenerationError,
    InputKind,
};
use lakegen_introspect::{profile_datasource, PostgresConnector, ProfileOptions};
use profiler_config::ProfilerConfig;
use registry::{
    init_run_logging, start_run, write_generation_report, write_metrics, write_profiles,
    RunContext, RunOptions,
};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
enum CliError {
    #[error("registry error: {0}")]
    Registry(#[from] registry::RegistryError),
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("{0} generation issue(s) reported as errors")]
    IssuesReported(usize),
}

#[derive(Parser, Debug)]
#[command(name = "lakegen", version, about = "Profile source schemas and generate ingestion artifacts")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Profile every configured source into a profiling document.
    Profile(ProfileArgs),
    /// Generate Oozie, Falcon and Hive artifacts from profiles or a table list.
    Generate(GenerateArgs),
    /// Validate a generator config and print the report.
    ValidateConfig(ValidateConfigArgs),
    /// Print a JSON Schema.
    ConfigSchema(ConfigSchemaArgs),
}

#[derive(Args, Debug)]
struct ProfileArgs {
    /// Profiler TOML config with [[source]] entries.
    #[arg(long)]
    config: PathBuf,
    /// Output directory for runs.
    #[arg(long, default_value = "runs")]
    run_dir: PathBuf,
    /// Optional output path for profiles.json.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Connection attempts per source.
    #[arg(long, default_value_t = 3)]
    max_attempts: u32,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Generator TOML config.
    #[arg(long)]
    config: PathBuf,
    /// Profiling document(s) produced by `lakegen profile`.
    #[arg(long, conflicts_with = "tables", required_unless_present = "tables")]
    profile: Option<PathBuf>,
    /// Tab-separated table list (Datasource, Schema, Table, MergeKey, CheckColumn).
    #[arg(long)]
    tables: Option<PathBuf>,
    /// Directory receiving artifacts/ and hive-create.sql.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
    /// Remove the previous artifacts/ directory first.
    #[arg(long, default_value_t = false)]
    clean: bool,
    /// Fail when any generation issue is an error.
    #[arg(long, default_value_t = false)]
    strict: bool,
    /// Output directory for runs.
    #[arg(long, default_value = "runs")]
    run_dir: PathBuf,
}

#[derive(Args, Debug)]
struct ValidateConfigArgs {
    #[arg(long)]
    config: PathBuf,
}

#[derive(Args, Debug)]
struct ConfigSchemaArgs {
    /// Print the profiling document schema instead of the generator config schema.
    #[arg(long, default_value_t = false)]
    profile: bool,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Profile(args) => run_profile(args).await,
        Command::Generate(args) => run_generate(args),
        Command::ValidateConfig(args) => run_validate_config(args),
        Command::ConfigSchema(args) => run_config_schema(args),
    }
}

async fn run_profile(args: ProfileArgs) -> Result<(), CliError> {
    let ProfileArgs {
        config,
        run_dir,
        out,
        max_attempts,
    } = args;

    let profiler_config = ProfilerConfig::load(&config)?;
    let targets = profiler_config.targets()?;

    let run_id = Uuid::new_v4().to_string();
    let run_ctx = RunContext {
        run_id: run_id.clone(),
        started_at: chrono::Utc::now(),
        run_dir,
        options: RunOptions::Profile {
            config,
            max_attempts,
            out: out.clone(),
        },
        connections: targets.iter().map(|target| target.connection.clone()).collect(),
    };

    let run_paths = start_run(&run_ctx)?;
    init_run_logging(&run_paths.logs_path)?;
    tracing::info!(event = "run_started", run_id = %run_id, command = "profile", sources = targets.len());

    let timer = Instant::now();
    let connector = PostgresConnector::default();
    let clock = SystemClock;
    let base_options = ProfileOptions {
        max_attempts,
        user: std::env::var("USER").ok(),
        working_directory: std::env::current_dir()
            .ok()
            .map(|dir| dir.display().to_string()),
        ..ProfileOptions::default()
    };

    let mut documents = Vec::with_capacity(targets.len());
    for target in targets {
        let options = base_options.clone().with_excludes(&target.exclude_tables);
        documents.push(profile_datasource(&connector, target.datasource, &options, &clock).await);
    }

    write_profiles(&run_paths, &documents, out.as_deref())?;
    tracing::info!(event = "profiles_written", path = %run_paths.profiles_path.display());

    let metrics = collect_profile_metrics(&documents);
    write_metrics(&run_paths, &metrics)?;
    tracing::info!(event = "metrics_written", path = %run_paths.metrics_path.display());

    let failed = documents.iter().filter(|doc| doc.is_failed()).count();
    let duration_ms = timer.elapsed().as_millis();
    tracing::info!(
        event = "run_finished",
        status = if failed == 0 { "success" } else { "partial" },
        failed_sources = failed,
        tables = metrics.counts.tables,
        duration_ms = duration_ms
    );

    Ok(())
}

fn run_generate(args: GenerateArgs) -> Result<(), CliError> {
    let GenerateArgs {
        config,
        profile,
        tables,
        out_dir,
        clean,
        strict,
        run_dir,
    } = args;

    let (input, input_kind) = match (profile, tables) {
        (Some(path), None) => (path, InputKind::Catalog),
        (None, Some(path)) => (path, InputKind::TableList),
        _ => {
            return Err(CliError::InvalidConfig(
                "use exactly one of --profile or --tables".to_string(),
            ));
        }
    };

    let validated = load_generation_config(&config)?;

    let run_id = Uuid::new_v4().to_string();
    let run_ctx = RunContext {
        run_id: run_id.clone(),
        started_at: chrono::Utc::now(),
        run_dir,
        options: RunOptions::Generate {
            config,
            input: input.clone(),
            input_kind: format!("{input_kind:?}"),
            out_dir: out_dir.clone(),
            clean,
            strict,
        },
        connections: Vec::new(),
    };

    let run_paths = start_run(&run_ctx)?;
    init_run_logging(&run_paths.logs_path)?;
    tracing::info!(event = "run_started", run_id = %run_id, command = "generate");
    for error in &validated.errors {
        tracing::warn!(event = "config_error", code = %error.code, path = %error.path, message = %error.message);
    }
    for warning in &validated.warnings {
        tracing::warn!(event = "config_warning", code = %warning.code, path = %warning.path, message = %warning.message);
    }

    let timer = Instant::now();
    let documents = match input_kind {
        InputKind::Catalog => read_profile_file(&input)?,
        InputKind::TableList => read_table_list(&input)?,
    };

    let metrics = collect_profile_metrics(&documents);
    write_metrics(&run_paths, &metrics)?;

    let clock = SystemClock;
    let output = ArtifactGenerator::new(&validated.config, &clock)
        .with_input(input_kind)
        .generate(&documents);

    let writer = ArtifactWriter::new(&out_dir).with_clean(clean);
    let summary = writer.write(&output.artifacts)?;
    let report_path = writer.write_report(&output.report)?;
    write_generation_report(&run_paths, &output.report)?;
    tracing::info!(event = "report_written", path = %report_path.display());

    let errors = output.report.error_count();
    let duration_ms = timer.elapsed().as_millis();
    tracing::info!(
        event = "run_finished",
        status = if errors == 0 { "success" } else { "partial" },
        files = summary.files,
        issues = output.report.issues.len(),
        fingerprint = %output.report.fingerprint,
        duration_ms = duration_ms
    );

    if strict && errors > 0 {
        return Err(CliError::IssuesReported(errors));
    }
    Ok(())
}

/// Schema-checked config for a generation run.
///
/// Referential errors are kept on the result instead of failing the load;
/// generation reports them and skips only the affected combinations.
fn load_generation_config(path: &Path) -> Result<ValidatedConfig, CliError> {
    Ok(parse_config_file(path)?)
}

fn run_validate_config(args: ValidateConfigArgs) -> Result<(), CliError> {
    match load_config_file(&args.config) {
        Ok(validated) => {
            let report = lakegen_config::ValidationReport {
                errors: Vec::new(),
                warnings: validated.warnings,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Err(ConfigError::Invalid(report)) => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            Err(CliError::InvalidConfig(format!(
                "{} error(s) in {}",
                report.errors.len(),
                args.config.display()
            )))
        }
        Err(err) => Err(err.into()),
    }
}

fn run_config_schema(args: ConfigSchemaArgs) -> Result<(), CliError> {
    let schema = if args.profile {
        serde_json::to_value(profile_json_schema())?
    } else {
        serde_json::to_value(config_json_schema())?
    };
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

use std::env;
use std::path::PathBuf;

use lakegen_config::parse_config_file;
use lakegen_core::SystemClock;
use lakegen_generate::{
    read_profile_file, read_table_list, ArtifactGenerator, ArtifactWriter, InputKind,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut args = env::args().skip(1);
    let mut config_path: Option<PathBuf> = None;
    let mut input: Option<(PathBuf, InputKind)> = None;
    let mut out_dir = PathBuf::from("out");

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => config_path = args.next().map(PathBuf::from),
            "--profile" => input = args.next().map(|p| (PathBuf::from(p), InputKind::Catalog)),
            "--tables" => input = args.next().map(|p| (PathBuf::from(p), InputKind::TableList)),
            "--out" => {
                if let Some(dir) = args.next() {
                    out_dir = PathBuf::from(dir);
                }
            }
            _ => return Err(format!("unexpected argument '{arg}'").into()),
        }
    }

    let config_path = config_path.ok_or("missing --config path")?;
    let (input_path, kind) = input.ok_or("missing --profile or --tables path")?;

    let validated = parse_config_file(&config_path)?;
    for error in &validated.errors {
        tracing::warn!(event = "config_error", code = %error.code, path = %error.path, message = %error.message);
    }
    let documents = match kind {
        InputKind::Catalog => read_profile_file(&input_path)?,
        InputKind::TableList => read_table_list(&input_path)?,
    };

    let clock = SystemClock;
    let output = ArtifactGenerator::new(&validated.config, &clock)
        .with_input(kind)
        .generate(&documents);

    let writer = ArtifactWriter::new(&out_dir).with_clean(true);
    let summary = writer.write(&output.artifacts)?;
    writer.write_report(&output.report)?;

    println!(
        "files={} issues={} fingerprint={}",
        summary.files,
        output.report.issues.len(),
        output.report.fingerprint
    );
    Ok(())
}

use std::env;
use std::path::PathBuf;

use lakegen_config::{load_config_file, ConfigError, ValidationReport};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("configs/generator.example.toml"));

    match load_config_file(&path) {
        Ok(validated) if validated.warnings.is_empty() => {
            println!("config validated successfully");
        }
        Ok(validated) => {
            eprintln!("config validated with warnings:");
            print_report(&ValidationReport {
                errors: Vec::new(),
                warnings: validated.warnings,
            });
        }
        Err(ConfigError::Invalid(report)) => {
            eprintln!("config validation failed");
            print_report(&report);
            std::process::exit(1);
        }
        Err(err) => return Err(err.into()),
    }

    Ok(())
}

fn print_report(report: &ValidationReport) {
    for issue in report.errors.iter().chain(report.warnings.iter()) {
        eprintln!("{:?} {} {}: {}", issue.severity, issue.code, issue.path, issue.message);
        if let Some(hint) = &issue.hint {
            eprintln!("  hint: {hint}");
        }
    }
}

use std::fs::{create_dir_all, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::errors::{GenerationError, Result};
use crate::model::{ArtifactSet, GenerationReport};

/// Directory holding per-entity artifacts, relative to the output directory.
pub const ARTIFACTS_DIR: &str = "artifacts";
pub const REPORT_FILE_NAME: &str = "generation_report.json";

/// Summary of a write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WriteSummary {
    pub files: u64,
    pub bytes: u64,
    pub cleaned: bool,
}

/// Persists an [`ArtifactSet`] under an output directory.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    out_dir: PathBuf,
    clean: bool,
}

impl ArtifactWriter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            clean: false,
        }
    }

    /// Remove the previous `artifacts/` tree before writing.
    pub fn with_clean(mut self, clean: bool) -> Self {
        self.clean = clean;
        self
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn write(&self, artifacts: &ArtifactSet) -> Result<WriteSummary> {
        let mut summary = WriteSummary::default();

        let artifacts_dir = self.out_dir.join(ARTIFACTS_DIR);
        if self.clean && artifacts_dir.exists() {
            std::fs::remove_dir_all(&artifacts_dir)?;
            summary.cleaned = true;
            tracing::info!(event = "artifacts_cleaned", path = %artifacts_dir.display());
        }

        for (relative, text) in artifacts.rendered()? {
            let path = self.resolve(&relative)?;
            write_bytes_atomic(&path, text.as_bytes())?;
            summary.files += 1;
            summary.bytes += text.len() as u64;
        }

        tracing::info!(
            event = "artifacts_written",
            out_dir = %self.out_dir.display(),
            files = summary.files,
            bytes = summary.bytes
        );
        Ok(summary)
    }

    pub fn write_report(&self, report: &GenerationReport) -> Result<PathBuf> {
        let path = self.out_dir.join(REPORT_FILE_NAME);
        write_json_atomic(&path, report)?;
        Ok(path)
    }

    fn resolve(&self, relative: &str) -> Result<PathBuf> {
        let relative = Path::new(relative);
        if relative.is_absolute()
            || relative
                .components()
                .any(|component| matches!(component, std::path::Component::ParentDir))
        {
            return Err(GenerationError::InvalidInput(format!(
                "artifact path '{}' escapes the output directory",
                relative.display()
            )));
        }
        Ok(self.out_dir.join(relative))
    }
}

pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let data = serde_json::to_vec_pretty(value)?;
    write_bytes_atomic(path, &data)
}

/// Write through a sibling temp file and rename into place.
pub fn write_bytes_atomic(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent)?;
        }
    }

    let tmp_path = temp_path(path)?;
    let mut file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&tmp_path)?;
    file.write_all(data)?;
    file.sync_all()?;

    std::fs::rename(&tmp_path, path)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            sync_dir(parent)?;
        }
    }

    Ok(())
}

fn temp_path(path: &Path) -> Result<PathBuf> {
    let file_name = path.file_name().ok_or_else(|| {
        GenerationError::InvalidInput(format!("invalid path for atomic write: {}", path.display()))
    })?;
    let tmp_name = format!("{}.tmp", file_name.to_string_lossy());
    Ok(path.with_file_name(tmp_name))
}

fn sync_dir(path: &Path) -> io::Result<()> {
    let dir = OpenOptions::new().read(true).open(path)?;
    dir.sync_all()
}

use thiserror::Error;

/// Errors emitted while reading generator input or writing artifacts.
///
/// Per-table problems never surface here; they are recorded as
/// [`crate::model::GenerationIssue`]s in the report.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("template error: {0}")]
    Template(#[from] crate::template::TemplateError),
}

/// Result type for generator I/O.
pub type Result<T> = std::result::Result<T, GenerationError>;

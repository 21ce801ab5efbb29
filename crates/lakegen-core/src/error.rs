use thiserror::Error;

/// Core error type shared across lakegen crates.
#[derive(Debug, Error)]
pub enum Error {
    /// Catalog query failure or connection loss.
    #[error("database error: {0}")]
    Db(String),
    /// Connection could not be established.
    #[error("connection error: {0}")]
    Connection(String),
    /// A profile violates internal invariants.
    #[error("invalid profile: {0}")]
    InvalidProfile(String),
    /// A data source definition could not be parsed.
    #[error("invalid data source: {0}")]
    InvalidDataSource(String),
    /// A requested feature is not yet supported.
    #[error("unsupported: {0}")]
    Unsupported(String),
    /// Catch-all error for unexpected failures.
    #[error("other error: {0}")]
    Other(String),
}

/// Convenience alias for results returned by lakegen crates.
pub type Result<T> = std::result::Result<T, Error>;

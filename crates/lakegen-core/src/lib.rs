//! Core contracts and helpers for lakegen.
//!
//! This crate defines the profile data model, the pure inference rules that
//! derive ingestion facts from catalog facts, and utilities shared across the
//! introspector, the generator and the CLI.

pub mod clock;
pub mod datasource;
pub mod error;
pub mod facts;
pub mod inference;
pub mod metrics;
pub mod profile;
pub mod redaction;
pub mod types;
pub mod validation;

pub use clock::{Clock, FixedClock, SystemClock};
pub use datasource::DataSource;
pub use error::{Error, Result};
pub use facts::{Column, IndexedColumn, RawTableFacts, RowStats, Uniqueness};
pub use inference::{estimate_size, incremental_mapper_count, infer, mapper_count};
pub use metrics::{classify_table, collect_profile_metrics, ProfileMetrics, SizeClass};
pub use profile::{
    ProfileBuilder, ProfileDocument, ProfileFile, ProfilingMetadata, TableProfile,
    PROFILE_TIMESTAMP_FORMAT,
};
pub use redaction::{redact_connection_string, RedactedConnection};
pub use types::{hive_type, java_type_override, TypeFamily};
pub use validation::validate_profile;

/// JSON Schema for a single profiling document.
pub fn profile_json_schema() -> schemars::schema::RootSchema {
    schemars::schema_for!(ProfileDocument)
}

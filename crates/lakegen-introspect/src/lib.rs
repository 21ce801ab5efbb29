//! Catalog introspection and the per-source profiling driver.

pub mod introspector;
pub mod options;
pub mod postgres;
pub mod profiler;

pub use introspector::{Connector, SchemaIntrospector};
pub use options::ProfileOptions;
pub use postgres::{PostgresConnector, PostgresIntrospector};
pub use profiler::{profile_all, profile_datasource};

pub use lakegen_core::ProfileDocument;

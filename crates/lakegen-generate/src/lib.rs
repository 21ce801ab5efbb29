//! Deterministic generation of Oozie, Falcon and Hive artifacts from table
//! profiles.
//!
//! [`ArtifactGenerator`] builds an in-memory [`ArtifactSet`] from profiling
//! documents and a generator config; [`ArtifactWriter`] renders and persists
//! it.

pub mod engine;
pub mod errors;
pub mod input;
pub mod model;
pub mod naming;
pub mod params;
pub mod properties;
pub mod render;
pub mod schedule;
pub mod template;
pub mod writer;

pub use engine::ArtifactGenerator;
pub use errors::{GenerationError, Result};
pub use input::{parse_profile_json, parse_table_list, read_profile_file, read_table_list};
pub use model::{
    Artifact, ArtifactKind, ArtifactSet, FalconFeedSpec, FalconHiveFeedSpec, FalconProcessSpec,
    GenerationIssue, GenerationOutput, GenerationReport, HiveDdlSpec, InputKind, OozieJobSpec,
};
pub use params::JobParams;
pub use properties::PropertySet;
pub use template::{TemplateError, ValueTemplates};
pub use writer::{ArtifactWriter, WriteSummary};

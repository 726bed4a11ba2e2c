//! # regmap-pack — Feature Mapping, Verification, and Artifacts
//!
//! Turns a parsed paragraph tree into the persisted artifacts the online
//! matcher consumes.
//!
//! - [`keyword`]: literal and pattern keyword rules.
//! - [`config`]: feature configuration files resolved into [`FeatureScope`].
//! - [`builder`]: the feature mapping builder.
//! - [`compare`]: structural comparison of two build outputs.
//! - [`artifact`]: `paragraphs.json`, `mappings.json`, `manifest.json`.
//! - [`pipeline`]: the batch build from source document to artifacts.
//! - [`parser`]: shared JSON/YAML file loading.

pub mod artifact;
pub mod builder;
pub mod compare;
pub mod config;
pub mod error;
pub mod keyword;
pub mod parser;
pub mod pipeline;

pub use artifact::{
    read_manifest, read_outputs, sha256_hex, write_manifest, write_outputs, ArtifactDigests,
    BuildManifest, MANIFEST_FILE, MAPPINGS_FILE, PARAGRAPHS_FILE,
};
pub use builder::build_mappings;
pub use compare::{compare_outputs, normalize_whitespace, VerificationReport};
pub use config::{FeatureConfigSet, FeatureScope};
pub use error::{PackError, PackResult};
pub use keyword::{Haystack, KeywordRule, KeywordSet};
pub use pipeline::{build, run_pipeline, BuildOutcome, BuildRequest, PipelineOutput};

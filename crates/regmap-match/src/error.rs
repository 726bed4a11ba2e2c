//! Matcher error types.
//!
//! Matching never fails because of sparse artifacts: missing mapping entries
//! and missing paragraph text are skipped. Errors come only from malformed
//! request input and from loading the artifacts themselves.

use thiserror::Error;

/// Errors that can occur while loading artifacts or matching requirements.
#[derive(Debug, Error)]
pub enum MatchError {
    /// The business profile is not a JSON object.
    #[error("invalid business profile: {detail}")]
    InvalidProfile { detail: String },

    /// A profile field has a value that cannot be interpreted.
    #[error("invalid value for profile field {field:?}: {value}")]
    InvalidField { field: &'static str, value: String },

    /// Artifact loading failed (delegated from regmap-pack).
    #[error("artifact error: {0}")]
    Pack(#[from] regmap_pack::PackError),

    /// A built-in range pattern failed to compile.
    #[error("pattern compilation failed: {0}")]
    Pattern(#[from] regex::Error),
}

/// Result type for matcher operations.
pub type MatchResult<T> = Result<T, MatchError>;

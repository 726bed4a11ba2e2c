//! Pack-specific error types.
//!
//! Structured errors for feature configuration loading, mapping builds, and
//! artifact I/O. All errors carry the file path involved where one exists.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during pack operations.
#[derive(Debug, Error)]
pub enum PackError {
    /// YAML parsing failed.
    #[error("failed to parse YAML at {path}: {source}")]
    YamlParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// JSON parsing failed.
    #[error("failed to parse JSON at {path}: {source}")]
    JsonParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// A required file was not found.
    #[error("required file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Configuration file extension is neither JSON nor YAML.
    #[error("unsupported configuration format for {path} (expected .json, .yaml or .yml)")]
    UnsupportedConfigFormat { path: PathBuf },

    /// Feature configuration is not a mapping at the top level.
    #[error("invalid feature configuration: {detail}")]
    InvalidFeatureConfig { detail: String },

    /// Writing an artifact failed.
    #[error("failed to write artifact {path}: {source}")]
    ArtifactWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Ingestion failed (delegated from regmap-ingest).
    #[error("ingestion error: {0}")]
    Ingest(#[from] regmap_ingest::IngestError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic serde_json error (not file-specific).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for pack operations.
pub type PackResult<T> = Result<T, PackError>;

//! Ingestion error types.
//!
//! Errors raised while turning a source document into a paragraph tree.
//! Individual backend failures are not surfaced here directly: the
//! extractor logs them and moves on. Only total failure is fatal.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during extraction, normalization, or parsing.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The source document could not be read.
    #[error("failed to read source document {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// No extraction chain exists for the file extension.
    #[error("unsupported document format {extension:?} for {path}")]
    UnsupportedFormat { path: PathBuf, extension: String },

    /// Every backend in the chain failed or produced only whitespace.
    #[error("no text could be extracted from {path} (tried: {tried})")]
    NoText { path: PathBuf, tried: String },

    /// A single backend failed. Logged and skipped by the extractor.
    #[error("extraction backend {backend} failed: {detail}")]
    Backend {
        backend: &'static str,
        detail: String,
    },

    /// Chapter marker configuration is unusable.
    #[error("invalid chapter marker configuration: {0}")]
    InvalidMarkers(String),

    /// A built-in pattern failed to compile.
    #[error("pattern compilation failed: {0}")]
    Pattern(#[from] regex::Error),
}

/// Result type for ingestion operations.
pub type IngestResult<T> = Result<T, IngestError>;

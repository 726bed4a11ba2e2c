//! # Build Pipeline
//!
//! Source document + feature configuration → persisted artifacts.
//!
//! ```text
//! extract → normalize → parse → build_mappings → (verify) → write
//! ```
//!
//! When a second rendition is supplied, both are run through the same
//! pipeline and compared before anything is written. A mismatch leaves the
//! output directory untouched.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{info, warn};

use regmap_core::{FeatureMapping, ParagraphTree};
use regmap_ingest::{ChapterMarkers, Ingestor};

use crate::artifact::{write_manifest, write_outputs, BuildManifest};
use crate::builder::build_mappings;
use crate::compare::{compare_outputs, VerificationReport};
use crate::config::FeatureConfigSet;
use crate::error::PackResult;

/// Result of running one document through the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub tree: ParagraphTree,
    pub mapping: FeatureMapping,
    pub backend: &'static str,
}

/// Extract, normalize, parse, and map one document.
pub fn run_pipeline(
    input: &Path,
    configs: &FeatureConfigSet,
    ingestor: &Ingestor,
) -> PackResult<PipelineOutput> {
    let doc = ingestor.ingest_file(input)?;
    let mapping = build_mappings(&doc.tree, configs);
    Ok(PipelineOutput {
        tree: doc.tree,
        mapping,
        backend: doc.backend,
    })
}

/// Inputs for a batch build.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub input: PathBuf,
    pub features: PathBuf,
    pub out_dir: PathBuf,
    /// Second rendition of the same document to verify against.
    pub verify_other: Option<PathBuf>,
    pub markers: ChapterMarkers,
}

/// What a build did.
#[derive(Debug, Clone)]
pub enum BuildOutcome {
    /// Artifacts were written.
    Written(BuildManifest),
    /// Verification failed; nothing was written.
    Mismatch(VerificationReport),
}

impl BuildOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Written(_))
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Run the batch build described by `request`.
pub fn build(request: &BuildRequest) -> PackResult<BuildOutcome> {
    let configs = FeatureConfigSet::load(&request.features)?;
    let ingestor = Ingestor::new(&request.markers)?;
    let primary = run_pipeline(&request.input, &configs, &ingestor)?;

    if let Some(other) = &request.verify_other {
        let secondary = run_pipeline(other, &configs, &ingestor)?;
        let report = compare_outputs(
            &primary.tree,
            &primary.mapping,
            &secondary.tree,
            &secondary.mapping,
        );
        if !report.equal {
            warn!(detail = %report.detail, "renditions differ; artifacts not written");
            return Ok(BuildOutcome::Mismatch(report));
        }
        info!(other = %other.display(), "renditions verified identical");
    }

    let digests = write_outputs(&request.out_dir, &primary.tree, &primary.mapping)?;
    let manifest = BuildManifest {
        source: file_name(&request.input),
        backend: primary.backend.to_string(),
        verified_against: request.verify_other.as_deref().map(file_name),
        generated_at: Utc::now(),
        categories: primary.tree.category_count(),
        paragraphs: primary.tree.paragraph_count(),
        features: primary.mapping.len(),
        paragraphs_sha256: digests.paragraphs_sha256,
        mappings_sha256: digests.mappings_sha256,
    };
    write_manifest(&request.out_dir, &manifest)?;
    Ok(BuildOutcome::Written(manifest))
}

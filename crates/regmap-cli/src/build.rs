//! # Build Subcommand
//!
//! Runs the offline pipeline on one source document and writes
//! `paragraphs.json`, `mappings.json` and `manifest.json`.
//!
//! ```bash
//! regmap build --input rules.pdf --features features.yaml --out out/
//! regmap build --input rules.pdf --verify-with rules.docx --features features.yaml
//! ```
//!
//! With `--verify-with`, both renditions are processed and compared first;
//! a mismatch prints the diagnostic, writes nothing, and exits with `1`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use regmap_pack::{build, BuildOutcome, BuildRequest};

use crate::config::RegmapConfig;

/// Arguments for `regmap build`.
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Source document (.pdf, .docx, .txt or .md).
    #[arg(long, short, value_name = "FILE")]
    pub input: PathBuf,

    /// Feature configuration (.json, .yaml or .yml).
    #[arg(long, short, value_name = "FILE")]
    pub features: Option<PathBuf>,

    /// Output directory. Defaults to the configured artifact directory.
    #[arg(long, short, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// A second rendition of the same document to verify against.
    #[arg(long, value_name = "FILE")]
    pub verify_with: Option<PathBuf>,

    /// Chapter marker word. Repeat for several; replaces the configured set.
    #[arg(long = "marker", value_name = "WORD")]
    pub markers: Vec<String>,

    /// Category label for chapters started without a header.
    #[arg(long, value_name = "LABEL")]
    pub chapter_label: Option<String>,
}

/// Execute `regmap build`.
///
/// Returns exit code: 0 when artifacts were written, 1 on a verification
/// mismatch.
pub fn run_build(args: &BuildArgs, config: &RegmapConfig) -> Result<u8> {
    let mut config = config.clone();
    if !args.markers.is_empty() {
        config.chapter_markers = args.markers.clone();
    }
    if let Some(label) = &args.chapter_label {
        config.chapter_label = label.clone();
    }

    let features = args
        .features
        .clone()
        .or_else(|| config.features_path.clone())
        .context("no feature configuration: pass --features or set REGMAP_FEATURES_PATH")?;

    let request = BuildRequest {
        input: args.input.clone(),
        features,
        out_dir: args.out.clone().unwrap_or_else(|| config.artifact_dir.clone()),
        verify_other: args.verify_with.clone(),
        markers: config.markers()?,
    };

    let outcome = build(&request)
        .with_context(|| format!("build failed for {}", request.input.display()))?;

    match outcome {
        BuildOutcome::Written(manifest) => {
            println!(
                "Wrote {} categories, {} paragraphs, {} features to {}",
                manifest.categories,
                manifest.paragraphs,
                manifest.features,
                request.out_dir.display()
            );
            if let Some(other) = &manifest.verified_against {
                println!("Verified against {other}");
            }
            Ok(0)
        }
        BuildOutcome::Mismatch(report) => {
            println!("Verification failed: {report}");
            Ok(1)
        }
    }
}

//! # Verify Subcommand
//!
//! Compares two persisted artifact directories with the verification
//! comparator.
//!
//! ```bash
//! regmap verify out-pdf/ out-docx/
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use regmap_pack::{compare_outputs, read_outputs};

/// Arguments for `regmap verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// First artifact directory.
    #[arg(value_name = "DIR_A")]
    pub left: PathBuf,

    /// Second artifact directory.
    #[arg(value_name = "DIR_B")]
    pub right: PathBuf,
}

/// Execute `regmap verify`.
///
/// Returns exit code: 0 when the builds are structurally equal, 1 otherwise.
pub fn run_verify(args: &VerifyArgs) -> Result<u8> {
    let (tree_a, map_a) = read_outputs(&args.left)
        .with_context(|| format!("failed to read artifacts in {}", args.left.display()))?;
    let (tree_b, map_b) = read_outputs(&args.right)
        .with_context(|| format!("failed to read artifacts in {}", args.right.display()))?;

    let report = compare_outputs(&tree_a, &map_a, &tree_b, &map_b);
    println!("{report}");
    Ok(if report.equal { 0 } else { 1 })
}

//! # Match and Features Subcommands
//!
//! Both read a business profile, load the artifacts once, and print JSON.
//!
//! ```bash
//! regmap match --profile restaurant.json --min-relevance 0.5
//! echo '{"size_m2": 120, "attributes": ["gas"]}' | regmap features
//! ```
//!
//! The profile comes from `--profile FILE` (JSON or YAML), `--answers JSON`,
//! or standard input.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use regmap_match::{ArtifactCache, BusinessProfile, Matcher};

use crate::config::RegmapConfig;

/// Where the business profile comes from.
#[derive(Args, Debug, Default)]
pub struct ProfileArgs {
    /// Profile file (.json, .yaml or .yml).
    #[arg(long, value_name = "FILE", conflicts_with = "answers")]
    pub profile: Option<PathBuf>,

    /// Inline profile JSON.
    #[arg(long, value_name = "JSON")]
    pub answers: Option<String>,

    /// Artifact directory. Defaults to the configured one.
    #[arg(long, value_name = "DIR")]
    pub artifacts: Option<PathBuf>,

    /// Feature configuration used for dynamic features.
    #[arg(long, value_name = "FILE")]
    pub features: Option<PathBuf>,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pub pretty: bool,
}

impl ProfileArgs {
    fn read_answers(&self) -> Result<Value> {
        if let Some(path) = &self.profile {
            return regmap_pack::parser::load_config_value(path)
                .with_context(|| format!("failed to read profile: {}", path.display()));
        }
        let raw = match &self.answers {
            Some(inline) => inline.clone(),
            None => {
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .context("failed to read profile from stdin")?;
                buf
            }
        };
        serde_json::from_str(&raw).context("profile is not valid JSON")
    }

    fn matcher(&self, config: &RegmapConfig) -> Result<Matcher> {
        let dir = self
            .artifacts
            .clone()
            .unwrap_or_else(|| config.artifact_dir.clone());
        let features = self.features.clone().or_else(|| config.features_path.clone());
        let cache = ArtifactCache::new(&dir, features);
        let store = cache
            .get_or_load()
            .with_context(|| format!("failed to load artifacts from {}", dir.display()))?;
        Ok(Matcher::new(store)?)
    }

    fn print<T: serde::Serialize>(&self, value: &T) -> Result<()> {
        let out = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        println!("{out}");
        Ok(())
    }
}

/// Arguments for `regmap match`.
#[derive(Args, Debug)]
pub struct MatchArgs {
    #[command(flatten)]
    pub profile: ProfileArgs,

    /// Drop requirements scoring below this relevance.
    #[arg(long, value_name = "SCORE")]
    pub min_relevance: Option<f64>,
}

/// Arguments for `regmap features`.
#[derive(Args, Debug)]
pub struct FeaturesArgs {
    #[command(flatten)]
    pub profile: ProfileArgs,
}

/// Execute `regmap match`, printing the full report.
pub fn run_match(args: &MatchArgs, config: &RegmapConfig) -> Result<u8> {
    let answers = args.profile.read_answers()?;
    let matcher = args.profile.matcher(config)?;
    let min_relevance = args.min_relevance.unwrap_or(config.min_relevance);
    let report = matcher.match_answers(&answers, min_relevance)?;
    tracing::info!(matches = report.total_matches, "requirements matched");
    args.profile.print(&report)?;
    Ok(0)
}

/// Execute `regmap features`, printing the applicable feature names.
pub fn run_features(args: &FeaturesArgs, config: &RegmapConfig) -> Result<u8> {
    let answers = args.profile.read_answers()?;
    let profile = BusinessProfile::from_value(&answers)?;
    let matcher = args.profile.matcher(config)?;
    args.profile.print(&matcher.get_applicable_features(&profile))?;
    Ok(0)
}

//! # CLI Configuration
//!
//! Settings are layered, lowest precedence first:
//!
//! 1. built-in defaults;
//! 2. an optional YAML or JSON file passed with `--config`;
//! 3. `REGMAP_ARTIFACT_DIR`, `REGMAP_FEATURES_PATH`,
//!    `REGMAP_MIN_RELEVANCE`, `REGMAP_CHAPTER_LABEL`;
//! 4. explicit subcommand flags (applied by each handler).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use regmap_ingest::markers::{DEFAULT_IMPLICIT_LABEL, DEFAULT_MARKERS};
use regmap_ingest::ChapterMarkers;
use regmap_match::DEFAULT_MIN_RELEVANCE;

pub const ENV_ARTIFACT_DIR: &str = "REGMAP_ARTIFACT_DIR";
pub const ENV_FEATURES_PATH: &str = "REGMAP_FEATURES_PATH";
pub const ENV_MIN_RELEVANCE: &str = "REGMAP_MIN_RELEVANCE";
pub const ENV_CHAPTER_LABEL: &str = "REGMAP_CHAPTER_LABEL";

/// Resolved CLI settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegmapConfig {
    /// Directory holding `paragraphs.json` and `mappings.json`.
    pub artifact_dir: PathBuf,
    /// Feature configuration file (JSON or YAML).
    pub features_path: Option<PathBuf>,
    pub min_relevance: f64,
    /// Category label for chapters started without a header.
    pub chapter_label: String,
    pub chapter_markers: Vec<String>,
}

impl Default for RegmapConfig {
    fn default() -> Self {
        Self {
            artifact_dir: PathBuf::from("out"),
            features_path: None,
            min_relevance: DEFAULT_MIN_RELEVANCE,
            chapter_label: DEFAULT_IMPLICIT_LABEL.to_string(),
            chapter_markers: DEFAULT_MARKERS.iter().map(|m| m.to_string()).collect(),
        }
    }
}

impl RegmapConfig {
    /// Defaults, then `file`, then the process environment.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        regmap_pack::parser::load_config_typed(path)
            .with_context(|| format!("failed to load config file: {}", path.display()))
    }

    /// Overlay environment values. `lookup` returns a variable's value.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(dir) = non_empty(ENV_ARTIFACT_DIR) {
            self.artifact_dir = PathBuf::from(dir);
        }
        if let Some(path) = non_empty(ENV_FEATURES_PATH) {
            self.features_path = Some(PathBuf::from(path));
        }
        if let Some(raw) = non_empty(ENV_MIN_RELEVANCE) {
            self.min_relevance = raw
                .trim()
                .parse::<f64>()
                .with_context(|| format!("{ENV_MIN_RELEVANCE} is not a number: {raw:?}"))?;
        }
        if let Some(label) = non_empty(ENV_CHAPTER_LABEL) {
            self.chapter_label = label;
        }
        Ok(())
    }

    /// Chapter markers built from the configured words and label.
    pub fn markers(&self) -> Result<ChapterMarkers> {
        ChapterMarkers::new(self.chapter_markers.iter().map(String::as_str), &self.chapter_label)
            .context("invalid chapter marker configuration")
    }
}

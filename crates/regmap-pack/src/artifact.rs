//! # Build Artifacts
//!
//! A build writes three files into its output directory:
//!
//! - `paragraphs.json`: the [`ParagraphTree`];
//! - `mappings.json`: the [`FeatureMapping`];
//! - `manifest.json`: a [`BuildManifest`] with the SHA-256 of the other two.
//!
//! JSON is pretty-printed UTF-8 with non-ASCII text left unescaped. Each
//! file is written to a sibling temporary path and renamed into place, so a
//! reader never observes a half-written artifact.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;

use regmap_core::{FeatureMapping, ParagraphTree};

use crate::error::{PackError, PackResult};
use crate::parser::load_json_typed;

pub const PARAGRAPHS_FILE: &str = "paragraphs.json";
pub const MAPPINGS_FILE: &str = "mappings.json";
pub const MANIFEST_FILE: &str = "manifest.json";

/// Provenance record for one build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildManifest {
    /// File name of the source document.
    pub source: String,
    /// Extraction backend that produced the text.
    pub backend: String,
    /// File name of the second rendition, when the build was verified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_against: Option<String>,
    pub generated_at: DateTime<Utc>,
    pub categories: usize,
    pub paragraphs: usize,
    pub features: usize,
    pub paragraphs_sha256: String,
    pub mappings_sha256: String,
}

/// Digests of the two data artifacts as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactDigests {
    pub paragraphs_sha256: String,
    pub mappings_sha256: String,
}

/// Lowercase hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest: [u8; 32] = Sha256::digest(bytes).into();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

fn write_atomic(path: &Path, bytes: &[u8]) -> PackResult<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    std::fs::write(&tmp, bytes).map_err(|e| PackError::ArtifactWrite {
        path: tmp.clone(),
        source: e,
    })?;
    std::fs::rename(&tmp, path).map_err(|e| PackError::ArtifactWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

fn to_pretty_json<T: Serialize>(value: &T) -> PackResult<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(value)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Write `paragraphs.json` and `mappings.json`, creating `out_dir`.
pub fn write_outputs(
    out_dir: &Path,
    tree: &ParagraphTree,
    mapping: &FeatureMapping,
) -> PackResult<ArtifactDigests> {
    std::fs::create_dir_all(out_dir).map_err(|e| PackError::ArtifactWrite {
        path: out_dir.to_path_buf(),
        source: e,
    })?;
    let paragraphs = to_pretty_json(tree)?;
    let mappings = to_pretty_json(mapping)?;
    write_atomic(&out_dir.join(PARAGRAPHS_FILE), &paragraphs)?;
    write_atomic(&out_dir.join(MAPPINGS_FILE), &mappings)?;
    info!(dir = %out_dir.display(), "artifacts written");
    Ok(ArtifactDigests {
        paragraphs_sha256: sha256_hex(&paragraphs),
        mappings_sha256: sha256_hex(&mappings),
    })
}

/// Write `manifest.json`.
pub fn write_manifest(out_dir: &Path, manifest: &BuildManifest) -> PackResult<()> {
    write_atomic(&out_dir.join(MANIFEST_FILE), &to_pretty_json(manifest)?)
}

/// Read `paragraphs.json` and `mappings.json` from `dir`.
pub fn read_outputs(dir: &Path) -> PackResult<(ParagraphTree, FeatureMapping)> {
    let tree = load_json_typed(&dir.join(PARAGRAPHS_FILE))?;
    let mapping = load_json_typed(&dir.join(MAPPINGS_FILE))?;
    Ok((tree, mapping))
}

/// Read `manifest.json` from `dir`.
pub fn read_manifest(dir: &Path) -> PackResult<BuildManifest> {
    load_json_typed(&dir.join(MANIFEST_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use regmap_core::{FeatureHits, ParagraphNumber};

    fn sample() -> (ParagraphTree, FeatureMapping) {
        let mut tree = ParagraphTree::new();
        let n = ParagraphNumber::parse("4.1").unwrap();
        tree.add_text("משרד הבריאות", &n, "4.1 שטח העסק");
        let mut hits = FeatureHits::new();
        hits.insert_hits("משרד הבריאות", vec![n]);
        let mut mapping = FeatureMapping::new();
        mapping.insert("size", hits);
        (tree, mapping)
    }

    #[test]
    fn sha256_of_empty_input() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn outputs_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let (tree, mapping) = sample();
        let digests = write_outputs(dir.path(), &tree, &mapping).unwrap();
        let (tree2, mapping2) = read_outputs(dir.path()).unwrap();
        assert_eq!(tree, tree2);
        assert_eq!(mapping, mapping2);

        let on_disk = std::fs::read(dir.path().join(PARAGRAPHS_FILE)).unwrap();
        assert_eq!(sha256_hex(&on_disk), digests.paragraphs_sha256);
        assert!(!dir.path().join("paragraphs.json.tmp").exists());
    }

    #[test]
    fn non_ascii_text_is_not_escaped() {
        let dir = tempfile::tempdir().unwrap();
        let (tree, mapping) = sample();
        write_outputs(dir.path(), &tree, &mapping).unwrap();
        let text = std::fs::read_to_string(dir.path().join(PARAGRAPHS_FILE)).unwrap();
        assert!(text.contains("משרד הבריאות"));
        assert!(!text.contains("\\u"));
    }

    #[test]
    fn nested_output_dir_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("a").join("b");
        let (tree, mapping) = sample();
        write_outputs(&out, &tree, &mapping).unwrap();
        assert!(out.join(MAPPINGS_FILE).exists());
    }

    #[test]
    fn manifest_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = BuildManifest {
            source: "rules.pdf".to_string(),
            backend: "pdf-extract".to_string(),
            verified_against: None,
            generated_at: Utc::now(),
            categories: 1,
            paragraphs: 2,
            features: 1,
            paragraphs_sha256: sha256_hex(b"p"),
            mappings_sha256: sha256_hex(b"m"),
        };
        write_manifest(dir.path(), &manifest).unwrap();
        assert_eq!(read_manifest(dir.path()).unwrap(), manifest);
        let raw = std::fs::read_to_string(dir.path().join(MANIFEST_FILE)).unwrap();
        assert!(!raw.contains("verified_against"));
    }

    #[test]
    fn missing_artifacts_are_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_outputs(dir.path()),
            Err(PackError::FileNotFound { .. })
        ));
    }
}

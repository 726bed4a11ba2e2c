//! # Artifact Store
//!
//! Read-only, process-wide view of one build: the paragraph tree, the
//! feature mapping, and the feature configuration that produced it.
//!
//! [`ArtifactCache`] memoizes the load. Repeated calls return the same
//! `Arc<ArtifactStore>` without touching storage; the cached value is
//! never invalidated except by [`ArtifactCache::reset`]. Regenerating the
//! artifacts while a process holds them is the caller's concern (the
//! build replaces files atomically).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use regmap_core::{FeatureMapping, ParagraphTree};
use regmap_pack::{read_manifest, read_outputs, BuildManifest, FeatureConfigSet, MANIFEST_FILE};

use crate::error::MatchResult;

/// One loaded build.
#[derive(Debug, Clone, Default)]
pub struct ArtifactStore {
    tree: ParagraphTree,
    mapping: FeatureMapping,
    features: FeatureConfigSet,
    manifest: Option<BuildManifest>,
}

impl ArtifactStore {
    pub fn new(tree: ParagraphTree, mapping: FeatureMapping, features: FeatureConfigSet) -> Self {
        Self {
            tree,
            mapping,
            features,
            manifest: None,
        }
    }

    /// Load `paragraphs.json` and `mappings.json` from `dir`, plus
    /// `manifest.json` when present. Without `features_path` no feature
    /// is treated as dynamically configured.
    pub fn load(dir: &Path, features_path: Option<&Path>) -> MatchResult<Self> {
        let (tree, mapping) = read_outputs(dir)?;
        let manifest = if dir.join(MANIFEST_FILE).is_file() {
            Some(read_manifest(dir)?)
        } else {
            None
        };
        let features = match features_path {
            Some(path) => FeatureConfigSet::load(path)?,
            None => FeatureConfigSet::default(),
        };
        info!(
            dir = %dir.display(),
            categories = tree.category_count(),
            features = mapping.len(),
            "artifacts loaded"
        );
        Ok(Self {
            tree,
            mapping,
            features,
            manifest,
        })
    }

    pub fn paragraph_tree(&self) -> &ParagraphTree {
        &self.tree
    }

    pub fn feature_mapping(&self) -> &FeatureMapping {
        &self.mapping
    }

    pub fn features(&self) -> &FeatureConfigSet {
        &self.features
    }

    pub fn manifest(&self) -> Option<&BuildManifest> {
        self.manifest.as_ref()
    }

    /// Text of one paragraph; empty when the lookup misses.
    pub fn paragraph_text(&self, category: &str, number: &str) -> &str {
        self.tree.paragraph_text(category, number)
    }
}

/// Memoized loader for one artifact directory.
#[derive(Debug)]
pub struct ArtifactCache {
    dir: PathBuf,
    features_path: Option<PathBuf>,
    slot: RwLock<Option<Arc<ArtifactStore>>>,
}

impl ArtifactCache {
    pub fn new(dir: impl Into<PathBuf>, features_path: Option<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            features_path,
            slot: RwLock::new(None),
        }
    }

    /// Return the cached store, loading it on first use.
    pub fn get_or_load(&self) -> MatchResult<Arc<ArtifactStore>> {
        if let Some(store) = self.slot.read().as_ref() {
            return Ok(Arc::clone(store));
        }
        let mut slot = self.slot.write();
        // Another caller may have loaded while we waited for the write lock.
        if let Some(store) = slot.as_ref() {
            return Ok(Arc::clone(store));
        }
        let store = Arc::new(ArtifactStore::load(
            &self.dir,
            self.features_path.as_deref(),
        )?);
        *slot = Some(Arc::clone(&store));
        Ok(store)
    }

    pub fn is_loaded(&self) -> bool {
        self.slot.read().is_some()
    }

    /// Drop the cached store; the next call reloads from disk.
    pub fn reset(&self) {
        *self.slot.write() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MatchError;
    use regmap_core::{FeatureHits, ParagraphNumber};
    use regmap_pack::{write_outputs, PackError};

    fn write_sample(dir: &Path) {
        let mut tree = ParagraphTree::new();
        let n = ParagraphNumber::parse("1.1").unwrap();
        tree.add_text("כללי", &n, "1.1 שילוט");
        let mut hits = FeatureHits::new();
        hits.insert_hits("כללי", vec![n]);
        let mut mapping = FeatureMapping::new();
        mapping.insert("signage", hits);
        write_outputs(dir, &tree, &mapping).unwrap();
    }

    #[test]
    fn load_reads_artifacts_and_optional_features() {
        let dir = tempfile::tempdir().unwrap();
        write_sample(dir.path());
        let features = dir.path().join("features.yaml");
        std::fs::write(&features, "signage:\n  keywords: [שילוט]\n").unwrap();

        let store = ArtifactStore::load(dir.path(), Some(&features)).unwrap();
        assert_eq!(store.paragraph_text("כללי", "1.1"), "1.1 שילוט");
        assert_eq!(store.paragraph_text("כללי", "9.9"), "");
        assert!(store.features().contains("signage"));
        assert!(store.manifest().is_none());

        let bare = ArtifactStore::load(dir.path(), None).unwrap();
        assert!(bare.features().is_empty());
    }

    #[test]
    fn cache_memoizes_until_reset() {
        let dir = tempfile::tempdir().unwrap();
        write_sample(dir.path());
        let cache = ArtifactCache::new(dir.path(), None);
        assert!(!cache.is_loaded());

        let first = cache.get_or_load().unwrap();
        std::fs::remove_file(dir.path().join(regmap_pack::PARAGRAPHS_FILE)).unwrap();
        let second = cache.get_or_load().unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        cache.reset();
        assert!(!cache.is_loaded());
        assert!(matches!(
            cache.get_or_load(),
            Err(MatchError::Pack(PackError::FileNotFound { .. }))
        ));
    }

    #[test]
    fn cache_is_shared_across_threads() {
        let dir = tempfile::tempdir().unwrap();
        write_sample(dir.path());
        let cache = Arc::new(ArtifactCache::new(dir.path(), None));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || cache.get_or_load().unwrap())
            })
            .collect();
        let stores: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(stores.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }
}

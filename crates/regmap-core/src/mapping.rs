//! # Feature Mapping
//!
//! Feature name → per-category paragraph hits.
//!
//! ## Persisted Shape
//!
//! ```json
//! {
//!   "gas": {
//!     "categories": { "Fire and Rescue": ["5.2", "5.2.1"] },
//!     "paragraphs": ["5.2", "5.2.1"]
//!   }
//! }
//! ```
//!
//! `paragraphs` is the deduplicated sorted union of every category list. It
//! is computed on serialization and recomputed on deserialization, so it can
//! never diverge from `categories`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::number::{sorted_unique, ParagraphNumber};

/// Wire representation of [`FeatureHits`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct FeatureHitsRepr {
    #[serde(default)]
    categories: BTreeMap<String, Vec<ParagraphNumber>>,
    #[serde(default)]
    paragraphs: Vec<ParagraphNumber>,
}

/// Matching paragraph numbers for one feature.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "FeatureHitsRepr", into = "FeatureHitsRepr")]
pub struct FeatureHits {
    categories: BTreeMap<String, Vec<ParagraphNumber>>,
}

impl FeatureHits {
    /// Create an empty hit set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge hits for a category. Empty inputs leave no category entry.
    pub fn insert_hits<I>(&mut self, category: &str, hits: I)
    where
        I: IntoIterator<Item = ParagraphNumber>,
    {
        let existing = self.categories.remove(category).unwrap_or_default();
        let merged = sorted_unique(existing.into_iter().chain(hits));
        if !merged.is_empty() {
            self.categories.insert(category.to_string(), merged);
        }
    }

    /// Per-category hit lists.
    pub fn categories(&self) -> &BTreeMap<String, Vec<ParagraphNumber>> {
        &self.categories
    }

    /// Hit list for one category (empty if absent).
    pub fn category(&self, name: &str) -> &[ParagraphNumber] {
        self.categories.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Deduplicated sorted union of every category list.
    pub fn paragraphs(&self) -> Vec<ParagraphNumber> {
        sorted_unique(self.categories.values().flatten().cloned())
    }

    /// Whether no category has a hit.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl From<FeatureHitsRepr> for FeatureHits {
    fn from(repr: FeatureHitsRepr) -> Self {
        let mut hits = FeatureHits::new();
        for (category, numbers) in repr.categories {
            hits.insert_hits(&category, numbers);
        }
        hits
    }
}

impl From<FeatureHits> for FeatureHitsRepr {
    fn from(hits: FeatureHits) -> Self {
        let paragraphs = hits.paragraphs();
        FeatureHitsRepr {
            categories: hits.categories,
            paragraphs,
        }
    }
}

/// Feature name → hits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureMapping {
    features: BTreeMap<String, FeatureHits>,
}

impl FeatureMapping {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) a feature entry.
    pub fn insert(&mut self, feature: &str, hits: FeatureHits) {
        self.features.insert(feature.to_string(), hits);
    }

    /// Look up a feature.
    pub fn get(&self, feature: &str) -> Option<&FeatureHits> {
        self.features.get(feature)
    }

    /// Feature names in sorted order.
    pub fn feature_names(&self) -> impl Iterator<Item = &str> {
        self.features.keys().map(String::as_str)
    }

    /// Iterate over `(feature, hits)`.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureHits)> {
        self.features.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of features.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether the mapping has no features.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

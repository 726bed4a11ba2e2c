//! # Feature Mapping Builder
//!
//! Paragraph tree + feature configuration → [`FeatureMapping`].
//!
//! The tree is flattened once into per-category rows of
//! `(paragraph number, text)`. A configuration may name a category either by
//! its name (the tree key, usually the chapter title) or by its chapter id;
//! both resolve to the same rows and hits are always recorded under the
//! category name, so every mapping entry can be looked up in the tree.
//!
//! A paragraph is a hit when any rule of the applicable keyword set matches
//! anywhere in its text.

use std::collections::BTreeMap;

use tracing::{debug, info};

use regmap_core::{FeatureHits, FeatureMapping, ParagraphNumber, ParagraphTree};

use crate::config::{FeatureConfigSet, FeatureScope};
use crate::keyword::{Haystack, KeywordSet};

/// Flattened, search-ready view of a paragraph tree.
struct CategoryIndex<'a> {
    rows: BTreeMap<&'a str, Vec<(&'a ParagraphNumber, Haystack<'a>)>>,
    chapter_aliases: BTreeMap<&'a str, Vec<&'a str>>,
}

impl<'a> CategoryIndex<'a> {
    fn new(tree: &'a ParagraphTree) -> Self {
        let mut rows = BTreeMap::new();
        let mut chapter_aliases: BTreeMap<&'a str, Vec<&'a str>> = BTreeMap::new();
        for (category, roots) in tree.iter() {
            for chapter in roots.keys() {
                chapter_aliases.entry(chapter.as_str()).or_default().push(category);
            }
            let flattened = tree
                .paragraphs(category)
                .into_iter()
                .map(|(number, text)| (number, Haystack::new(text)))
                .collect();
            rows.insert(category, flattened);
        }
        Self {
            rows,
            chapter_aliases,
        }
    }

    /// Category names a configured name refers to. An exact category name
    /// wins over a chapter id.
    fn resolve(&self, name: &str) -> Vec<&'a str> {
        if let Some((category, _)) = self.rows.get_key_value(name) {
            return vec![*category];
        }
        match self.chapter_aliases.get(name) {
            Some(categories) => categories.clone(),
            None => {
                debug!(category = name, "configured category not present in document");
                Vec::new()
            }
        }
    }

    fn all(&self) -> Vec<&'a str> {
        self.rows.keys().copied().collect()
    }

    fn hits(&self, category: &str, keywords: &KeywordSet) -> Vec<ParagraphNumber> {
        if keywords.is_empty() {
            return Vec::new();
        }
        self.rows
            .get(category)
            .map(|rows| {
                rows.iter()
                    .filter(|(_, haystack)| keywords.matches(haystack))
                    .map(|(number, _)| (*number).clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn feature_hits(index: &CategoryIndex<'_>, scope: &FeatureScope) -> FeatureHits {
    let mut hits = FeatureHits::new();
    match scope {
        FeatureScope::PerCategoryKeywords { categories, global } => {
            for (name, keywords) in categories {
                let keywords = keywords.merged(global);
                for category in index.resolve(name) {
                    hits.insert_hits(category, index.hits(category, &keywords));
                }
            }
        }
        FeatureScope::SingleCategory { category, keywords } => {
            for resolved in index.resolve(category) {
                hits.insert_hits(resolved, index.hits(resolved, keywords));
            }
        }
        FeatureScope::AllCategories { keywords } | FeatureScope::LegacyAllCategories { keywords } => {
            for category in index.all() {
                hits.insert_hits(category, index.hits(category, keywords));
            }
        }
    }
    hits
}

/// Build the feature mapping for every configured feature. Features with no
/// hits are present with empty lists.
pub fn build_mappings(tree: &ParagraphTree, configs: &FeatureConfigSet) -> FeatureMapping {
    let index = CategoryIndex::new(tree);
    let mut mapping = FeatureMapping::new();
    for (feature, scope) in configs.iter() {
        let hits = feature_hits(&index, scope);
        debug!(
            feature,
            scope = scope.kind(),
            categories = hits.categories().len(),
            "feature mapped"
        );
        mapping.insert(feature, hits);
    }
    info!(features = mapping.len(), "feature mappings built");
    mapping
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use regmap_core::sorted_unique;
    use regmap_ingest::{ChapterMarkers, Ingestor};
    use serde_json::json;

    proptest! {
        /// Every feature's union equals the sorted dedup of its category lists,
        /// and every category list is itself sorted and unique.
        #[test]
        fn union_invariant_holds(
            words in prop::collection::vec("[a-e]{1,3}", 1..30),
            keyword in "[a-e]{1,2}",
        ) {
            let text: String = words
                .iter()
                .enumerate()
                .map(|(i, w)| format!("{}.{} {w}\n", i % 3 + 1, i))
                .collect();
            let tree = Ingestor::new(&ChapterMarkers::default()).unwrap().parse_text(&text);
            let cfg = FeatureConfigSet::from_value(&json!({
                "f": {"keywords": [keyword.clone()]},
                "g": {"categories": {"1": [keyword]}}
            }))
            .unwrap();
            let mapping = build_mappings(&tree, &cfg);
            for (_, hits) in mapping.iter() {
                let expected = sorted_unique(hits.categories().values().flatten().cloned());
                prop_assert_eq!(hits.paragraphs(), expected);
                for list in hits.categories().values() {
                    prop_assert_eq!(list.clone(), sorted_unique(list.clone()));
                }
            }
        }
    }
}

//! # Verification Comparator
//!
//! Structural equality of two `(tree, mapping)` pairs built from two
//! renditions of the same document (for example a PDF and a DOCX export).
//!
//! Checks run in a fixed order and stop at the first mismatch:
//!
//! 1. category name sets;
//! 2. paragraph number sets per category;
//! 3. paragraph texts, after whitespace normalization;
//! 4. feature name sets;
//! 5. per feature: union list, category set, per-category hit lists.
//!
//! All comparisons are order-insensitive. The result is a verdict plus one
//! diagnostic line, not an exhaustive diff.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use regmap_core::{FeatureMapping, ParagraphNumber, ParagraphTree};

/// Maximum examples listed on each side of a set difference.
const MAX_EXAMPLES: usize = 10;

/// Outcome of a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub equal: bool,
    /// Empty when `equal`; otherwise describes the first mismatch.
    pub detail: String,
}

impl VerificationReport {
    pub fn equal() -> Self {
        Self {
            equal: true,
            detail: String::new(),
        }
    }

    pub fn mismatch(detail: impl Into<String>) -> Self {
        Self {
            equal: false,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.equal {
            f.write_str("outputs are structurally identical")
        } else {
            f.write_str(&self.detail)
        }
    }
}

/// Collapse every whitespace run to one space and trim.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn examples<T: Ord + fmt::Display>(set: impl IntoIterator<Item = T>) -> String {
    let mut items: Vec<T> = set.into_iter().collect();
    items.sort();
    let shown: Vec<String> = items
        .iter()
        .take(MAX_EXAMPLES)
        .map(|i| format!("{:?}", i.to_string()))
        .collect();
    format!("[{}]", shown.join(", "))
}

fn path_of(category: &str, number: &ParagraphNumber) -> String {
    let mut parts = vec!["paragraphs".to_string(), category.to_string()];
    parts.extend(number.ancestors().into_iter().map(String::from));
    parts.push(number.to_string());
    parts.join("/")
}

/// Compare two build outputs.
pub fn compare_outputs(
    tree_a: &ParagraphTree,
    map_a: &FeatureMapping,
    tree_b: &ParagraphTree,
    map_b: &FeatureMapping,
) -> VerificationReport {
    let cats_a: BTreeSet<&str> = tree_a.category_names().collect();
    let cats_b: BTreeSet<&str> = tree_b.category_names().collect();
    if cats_a != cats_b {
        return VerificationReport::mismatch(format!(
            "Category titles differ. only_in_A={} only_in_B={}",
            examples(cats_a.difference(&cats_b)),
            examples(cats_b.difference(&cats_a)),
        ));
    }

    for category in &cats_a {
        let nums_a: BTreeSet<ParagraphNumber> = tree_a.numbers(category).into_iter().collect();
        let nums_b: BTreeSet<ParagraphNumber> = tree_b.numbers(category).into_iter().collect();
        if nums_a != nums_b {
            return VerificationReport::mismatch(format!(
                "Paragraph numbers differ in category '{category}'. missing_in_A={} missing_in_B={}",
                examples(nums_b.difference(&nums_a)),
                examples(nums_a.difference(&nums_b)),
            ));
        }
    }

    for category in &cats_a {
        for (number, text_a) in tree_a.paragraphs(category) {
            let text_b = tree_b.paragraph_text(category, number.as_str());
            if normalize_whitespace(text_a) != normalize_whitespace(text_b) {
                return VerificationReport::mismatch(format!(
                    "Text differs at {}.",
                    path_of(category, number)
                ));
            }
        }
    }

    let feats_a: BTreeSet<&str> = map_a.feature_names().collect();
    let feats_b: BTreeSet<&str> = map_b.feature_names().collect();
    if feats_a != feats_b {
        return VerificationReport::mismatch(format!(
            "Feature keys differ. only_in_A={} only_in_B={}",
            examples(feats_a.difference(&feats_b)),
            examples(feats_b.difference(&feats_a)),
        ));
    }

    for feature in &feats_a {
        let (Some(a), Some(b)) = (map_a.get(feature), map_b.get(feature)) else {
            continue;
        };
        let union_a: BTreeSet<ParagraphNumber> = a.paragraphs().into_iter().collect();
        let union_b: BTreeSet<ParagraphNumber> = b.paragraphs().into_iter().collect();
        if union_a != union_b {
            return VerificationReport::mismatch(format!(
                "Union paragraphs differ for feature '{feature}'"
            ));
        }
        let fcats_a: BTreeSet<&String> = a.categories().keys().collect();
        let fcats_b: BTreeSet<&String> = b.categories().keys().collect();
        if fcats_a != fcats_b {
            return VerificationReport::mismatch(format!(
                "Categories differ for feature '{feature}'"
            ));
        }
        for category in fcats_a {
            let hits_a: BTreeSet<&ParagraphNumber> = a.category(category).iter().collect();
            let hits_b: BTreeSet<&ParagraphNumber> = b.category(category).iter().collect();
            if hits_a != hits_b {
                return VerificationReport::mismatch(format!(
                    "Paragraph hits differ for feature '{feature}', category '{category}'"
                ));
            }
        }
    }

    VerificationReport::equal()
}

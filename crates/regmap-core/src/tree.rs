//! # Paragraph Tree
//!
//! The parsed document: category name → chapter roots → nested paragraphs.
//!
//! ## Persisted Shape
//!
//! ```json
//! {
//!   "Fire and Rescue": {
//!     "5": {
//!       "text": "",
//!       "5.1": { "text": "5.1 Every business ...", "5.1.1": { "text": "..." } }
//!     }
//!   }
//! }
//! ```
//!
//! Children are stored as an explicit map on each node rather than as
//! concatenated keys on a flat object. [`ParagraphTree::ensure_node`] creates
//! every ancestor on the way down, so a deep key never exists without its
//! prefixes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::number::{sorted_unique, ParagraphNumber};

/// One numbered clause.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphNode {
    /// Accumulated text, space-joined from every attributed source line.
    #[serde(default)]
    pub text: String,
    /// Direct children keyed by their full dotted path.
    #[serde(flatten)]
    pub children: BTreeMap<ParagraphNumber, ParagraphNode>,
}

impl ParagraphNode {
    /// Append a line of text, separated by one space, and trim the result.
    pub fn append_text(&mut self, line: &str) {
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(line);
        let trimmed = self.text.trim();
        if trimmed.len() != self.text.len() {
            self.text = trimmed.to_string();
        }
    }
}

/// Category name → chapter roots.
pub type CategoryNodes = BTreeMap<ParagraphNumber, ParagraphNode>;

/// The full paragraph hierarchy of one document revision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParagraphTree {
    categories: BTreeMap<String, CategoryNodes>,
}

impl ParagraphTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no category has been recorded.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Number of categories.
    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    /// Category names in sorted order.
    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// Chapter roots of a category.
    pub fn category(&self, name: &str) -> Option<&CategoryNodes> {
        self.categories.get(name)
    }

    /// Iterate over `(category name, chapter roots)`.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CategoryNodes)> {
        self.categories.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Chapter ids (root keys) of a category.
    pub fn chapter_ids(&self, name: &str) -> Vec<&ParagraphNumber> {
        self.categories
            .get(name)
            .map(|roots| roots.keys().collect())
            .unwrap_or_default()
    }

    /// Get or create the node at `number`, creating every ancestor first.
    pub fn ensure_node(&mut self, category: &str, number: &ParagraphNumber) -> &mut ParagraphNode {
        let mut level = self.categories.entry(category.to_string()).or_default();
        for ancestor in number.ancestors() {
            level = &mut level.entry(ancestor).or_default().children;
        }
        level.entry(number.clone()).or_default()
    }

    /// Append `text` to the node at `number`, creating it if needed.
    pub fn add_text(&mut self, category: &str, number: &ParagraphNumber, text: &str) {
        self.ensure_node(category, number).append_text(text);
    }

    /// Look up a node by category and dotted path.
    pub fn node(&self, category: &str, number: &str) -> Option<&ParagraphNode> {
        let mut level = self.categories.get(category)?;
        let segments: Vec<&str> = number.split('.').collect();
        let mut found = None;
        for end in 1..=segments.len() {
            let key = ParagraphNumber::parse(&segments[..end].join(".")).ok()?;
            let node = level.get(&key)?;
            level = &node.children;
            found = Some(node);
        }
        found
    }

    /// Text of a paragraph, or `""` if any path segment is absent.
    ///
    /// Missing data is not an error: callers treat the empty string as
    /// "no data" and skip the entry.
    pub fn paragraph_text(&self, category: &str, number: &str) -> &str {
        self.node(category, number)
            .map(|n| n.text.as_str())
            .unwrap_or("")
    }

    /// Every `(number, text)` pair in a category, depth-first.
    pub fn paragraphs(&self, category: &str) -> Vec<(&ParagraphNumber, &str)> {
        let mut rows = Vec::new();
        if let Some(roots) = self.categories.get(category) {
            let mut stack: Vec<(&ParagraphNumber, &ParagraphNode)> = roots.iter().rev().collect();
            while let Some((number, node)) = stack.pop() {
                rows.push((number, node.text.as_str()));
                stack.extend(node.children.iter().rev());
            }
        }
        rows
    }

    /// All paragraph numbers in a category, deduplicated and sorted.
    pub fn numbers(&self, category: &str) -> Vec<ParagraphNumber> {
        sorted_unique(self.paragraphs(category).into_iter().map(|(n, _)| n.clone()))
    }

    /// Total number of nodes across all categories.
    pub fn paragraph_count(&self) -> usize {
        self.categories
            .keys()
            .map(|name| self.paragraphs(name).len())
            .sum()
    }
}

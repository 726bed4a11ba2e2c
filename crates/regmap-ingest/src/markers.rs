//! # Chapter Markers
//!
//! The words that introduce a chapter header (`פרק 4 - ...`,
//! `Chapter 4 - ...`) and the label used for chapters that start implicitly,
//! when a document opens with numbered paragraphs and no header.
//!
//! The normalizer's header repair and the parser's header detection are both
//! built from the same [`ChapterMarkers`] value, so a document cleaned with
//! one marker set is always parsed with the same set.

use crate::error::{IngestError, IngestResult};

/// Default marker words, matched case-insensitively.
pub const DEFAULT_MARKERS: &[&str] = &["פרק", "Chapter"];

/// Default label for implicitly started chapters.
pub const DEFAULT_IMPLICIT_LABEL: &str = "Chapter";

/// Recognized chapter marker words plus the implicit-chapter label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterMarkers {
    markers: Vec<String>,
    implicit_label: String,
}

impl ChapterMarkers {
    /// Build a marker set. At least one non-blank marker is required and the
    /// label must not be blank.
    pub fn new<I, S>(markers: I, implicit_label: &str) -> IngestResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut cleaned: Vec<String> = Vec::new();
        for marker in markers {
            let marker: String = marker.into();
            let marker = marker.trim();
            if marker.is_empty() {
                return Err(IngestError::InvalidMarkers(
                    "chapter marker must not be blank".to_string(),
                ));
            }
            if !cleaned.iter().any(|m| m.to_lowercase() == marker.to_lowercase()) {
                cleaned.push(marker.to_string());
            }
        }
        if cleaned.is_empty() {
            return Err(IngestError::InvalidMarkers(
                "at least one chapter marker is required".to_string(),
            ));
        }
        let implicit_label = implicit_label.trim();
        if implicit_label.is_empty() {
            return Err(IngestError::InvalidMarkers(
                "implicit chapter label must not be blank".to_string(),
            ));
        }
        Ok(Self {
            markers: cleaned,
            implicit_label: implicit_label.to_string(),
        })
    }

    /// Replace the implicit-chapter label, keeping the markers.
    pub fn with_implicit_label(self, label: &str) -> IngestResult<Self> {
        Self::new(self.markers, label)
    }

    /// Marker words in configured order.
    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    /// Label used for chapters that start without a header.
    pub fn implicit_label(&self) -> &str {
        &self.implicit_label
    }

    /// Regex alternation of the escaped markers, without flags or groups.
    pub(crate) fn alternation(&self) -> String {
        self.markers
            .iter()
            .map(|m| regex::escape(m))
            .collect::<Vec<_>>()
            .join("|")
    }

    /// The configured spelling of a marker matched case-insensitively.
    pub(crate) fn configured_spelling<'a>(&'a self, matched: &'a str) -> &'a str {
        let lowered = matched.to_lowercase();
        self.markers
            .iter()
            .find(|m| m.to_lowercase() == lowered)
            .map(String::as_str)
            .unwrap_or(matched)
    }

    /// Category name for a chapter that starts without a header.
    pub fn implicit_category(&self, chapter: &str) -> String {
        format!("{} {chapter}", self.implicit_label)
    }
}

impl Default for ChapterMarkers {
    fn default() -> Self {
        Self {
            markers: DEFAULT_MARKERS.iter().map(|m| m.to_string()).collect(),
            implicit_label: DEFAULT_IMPLICIT_LABEL.to_string(),
        }
    }
}

//! # Paragraph Numbers — Validated Dotted Paths
//!
//! A paragraph is addressed by a dotted numeric path such as `4.6.3`. The
//! first segment is the chapter id. Paths are capped at
//! [`MAX_PARAGRAPH_DEPTH`] segments.
//!
//! ## Ordering
//!
//! Paragraph-number lists are ordered by `(dot count, lexicographic string)`:
//! all chapter roots first, then all second-level numbers, and so on. This is
//! the order used for every persisted hit list, so it must stay stable.
//!
//! ## Canonicalization
//!
//! Numbers found in the source are often relative to the enclosing chapter
//! (`1.2` inside chapter 4 means `4.1.2`). [`canonicalize_number`] resolves a
//! raw number against the current chapter and is idempotent under the same
//! chapter context.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum number of dot-separated segments in a paragraph number.
pub const MAX_PARAGRAPH_DEPTH: usize = 20;

/// A validated dotted paragraph path (`"4"`, `"4.6"`, `"4.6.3"`).
///
/// Serialized as a plain string. Deserialization re-validates the input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ParagraphNumber(String);

impl ParagraphNumber {
    /// Parse and validate a dotted paragraph path.
    ///
    /// Every segment must be a non-empty run of ASCII digits and the path may
    /// have at most [`MAX_PARAGRAPH_DEPTH`] segments.
    pub fn parse(input: &str) -> Result<Self, CoreError> {
        if input.is_empty() {
            return Err(CoreError::InvalidParagraphNumber {
                input: input.to_string(),
                reason: "empty".to_string(),
            });
        }
        let mut depth = 0usize;
        for segment in input.split('.') {
            depth += 1;
            if segment.is_empty() {
                return Err(CoreError::InvalidParagraphNumber {
                    input: input.to_string(),
                    reason: "empty segment".to_string(),
                });
            }
            if !segment.bytes().all(|b| b.is_ascii_digit()) {
                return Err(CoreError::InvalidParagraphNumber {
                    input: input.to_string(),
                    reason: format!("segment {segment:?} is not a decimal number"),
                });
            }
        }
        if depth > MAX_PARAGRAPH_DEPTH {
            return Err(CoreError::ParagraphTooDeep {
                input: input.to_string(),
                depth,
                max: MAX_PARAGRAPH_DEPTH,
            });
        }
        Ok(Self(input.to_string()))
    }

    /// Canonicalize a raw number against `chapter` and validate the result.
    pub fn canonical(raw: &str, chapter: Option<&str>) -> Result<Self, CoreError> {
        Self::parse(&canonicalize_number(raw, chapter))
    }

    /// The dotted path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of dot-separated segments.
    pub fn depth(&self) -> usize {
        self.dot_count() + 1
    }

    /// Number of `.` separators.
    pub fn dot_count(&self) -> usize {
        self.0.bytes().filter(|b| *b == b'.').count()
    }

    /// The chapter id (first segment).
    pub fn chapter(&self) -> &str {
        self.0.split('.').next().unwrap_or(&self.0)
    }

    /// Iterate over the segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// Whether this is a chapter root (single segment).
    pub fn is_root(&self) -> bool {
        self.dot_count() == 0
    }

    /// Strict ancestor paths, shallowest first: `4.6.3` yields `4`, `4.6`.
    pub fn ancestors(&self) -> Vec<ParagraphNumber> {
        self.0
            .match_indices('.')
            .map(|(idx, _)| Self(self.0[..idx].to_string()))
            .collect()
    }

    /// The direct parent path, or `None` for a chapter root.
    pub fn parent(&self) -> Option<ParagraphNumber> {
        self.0.rfind('.').map(|idx| Self(self.0[..idx].to_string()))
    }
}

impl Ord for ParagraphNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dot_count()
            .cmp(&other.dot_count())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for ParagraphNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ParagraphNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ParagraphNumber {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ParagraphNumber> for String {
    fn from(value: ParagraphNumber) -> Self {
        value.0
    }
}

impl std::str::FromStr for ParagraphNumber {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Resolve a raw paragraph number against the current chapter.
///
/// - No chapter context: the raw number is returned unchanged.
/// - Already absolute under the chapter (`4` or `4.x`): unchanged.
/// - Otherwise: prefixed with `"{chapter}."`.
///
/// ```
/// use regmap_core::canonicalize_number;
///
/// assert_eq!(canonicalize_number("4", None), "4");
/// assert_eq!(canonicalize_number("1", Some("4")), "4.1");
/// assert_eq!(canonicalize_number("4.1", Some("4")), "4.1");
/// ```
pub fn canonicalize_number(raw: &str, chapter: Option<&str>) -> String {
    match chapter {
        None => raw.to_string(),
        Some("") => raw.to_string(),
        Some(ch) => {
            let absolute = raw == ch
                || (raw.len() > ch.len() && raw.starts_with(ch) && raw.as_bytes()[ch.len()] == b'.');
            if absolute {
                raw.to_string()
            } else {
                format!("{ch}.{raw}")
            }
        }
    }
}

/// Deduplicate and sort paragraph numbers by `(dot count, lexicographic)`.
pub fn sorted_unique<I>(numbers: I) -> Vec<ParagraphNumber>
where
    I: IntoIterator<Item = ParagraphNumber>,
{
    numbers
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(s: &str) -> ParagraphNumber {
        ParagraphNumber::parse(s).unwrap()
    }

    #[test]
    fn parse_accepts_dotted_digits() {
        assert_eq!(num("4.6.3").as_str(), "4.6.3");
        assert_eq!(num("4.6.3").depth(), 3);
        assert_eq!(num("4.6.3").chapter(), "4");
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!(ParagraphNumber::parse("").is_err());
        assert!(ParagraphNumber::parse("4.").is_err());
        assert!(ParagraphNumber::parse(".4").is_err());
        assert!(ParagraphNumber::parse("4..1").is_err());
        assert!(ParagraphNumber::parse("4.a").is_err());
        assert!(ParagraphNumber::parse("4 1").is_err());
    }

    #[test]
    fn parse_enforces_depth_cap() {
        let twenty = vec!["1"; 20].join(".");
        assert!(ParagraphNumber::parse(&twenty).is_ok());
        let twenty_one = vec!["1"; 21].join(".");
        assert!(matches!(
            ParagraphNumber::parse(&twenty_one),
            Err(CoreError::ParagraphTooDeep { depth: 21, .. })
        ));
    }

    #[test]
    fn ancestors_are_strict_prefixes() {
        let a: Vec<String> = num("4.6.3").ancestors().into_iter().map(String::from).collect();
        assert_eq!(a, vec!["4", "4.6"]);
        assert!(num("4").ancestors().is_empty());
        assert_eq!(num("4.6.3").parent(), Some(num("4.6")));
        assert_eq!(num("4").parent(), None);
    }

    #[test]
    fn ordering_is_depth_then_lexicographic() {
        let sorted = sorted_unique(vec![num("4.10"), num("4.2"), num("5"), num("4"), num("4.1.1")]);
        let as_str: Vec<&str> = sorted.iter().map(|n| n.as_str()).collect();
        assert_eq!(as_str, vec!["4", "5", "4.10", "4.2", "4.1.1"]);
    }

    #[test]
    fn sorted_unique_removes_duplicates() {
        let sorted = sorted_unique(vec![num("4.1"), num("4.1"), num("4")]);
        assert_eq!(sorted, vec![num("4"), num("4.1")]);
    }

    #[test]
    fn canonicalize_without_chapter_is_identity() {
        assert_eq!(canonicalize_number("7.2", None), "7.2");
    }

    #[test]
    fn canonicalize_relative_number_gets_prefix() {
        assert_eq!(canonicalize_number("1.2", Some("4")), "4.1.2");
    }

    #[test]
    fn canonicalize_does_not_confuse_prefix_digits() {
        // "41.2" is not under chapter "4".
        assert_eq!(canonicalize_number("41.2", Some("4")), "4.41.2");
        assert_eq!(canonicalize_number("4.2", Some("4")), "4.2");
    }

    #[test]
    fn serde_round_trip_validates() {
        let n: ParagraphNumber = serde_json::from_str("\"4.6\"").unwrap();
        assert_eq!(n, num("4.6"));
        assert_eq!(serde_json::to_string(&n).unwrap(), "\"4.6\"");
        assert!(serde_json::from_str::<ParagraphNumber>("\"4.x\"").is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn raw_number() -> impl Strategy<Value = String> {
        prop::collection::vec(0u32..40, 1..6).prop_map(|segs| {
            segs.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(".")
        })
    }

    proptest! {
        /// Re-canonicalizing under the same chapter is a no-op.
        #[test]
        fn canonicalize_is_idempotent(raw in raw_number(), chapter in 1u32..30) {
            let ch = chapter.to_string();
            let once = canonicalize_number(&raw, Some(&ch));
            let twice = canonicalize_number(&once, Some(&ch));
            prop_assert_eq!(&once, &twice);
        }

        /// The canonical number always lives under the chapter it was resolved against.
        #[test]
        fn canonical_chapter_prefix_matches(raw in raw_number(), chapter in 1u32..30) {
            let ch = chapter.to_string();
            let n = ParagraphNumber::canonical(&raw, Some(&ch)).unwrap();
            prop_assert_eq!(n.chapter(), ch.as_str());
        }

        /// Sorting is stable: no duplicates, and re-sorting changes nothing.
        #[test]
        fn sorted_unique_is_stable(raws in prop::collection::vec(raw_number(), 0..30)) {
            let nums: Vec<ParagraphNumber> = raws.iter().map(|r| ParagraphNumber::parse(r).unwrap()).collect();
            let once = sorted_unique(nums);
            let twice = sorted_unique(once.clone());
            prop_assert_eq!(&once, &twice);
            for pair in once.windows(2) {
                prop_assert!(pair[0] < pair[1]);
                prop_assert!(pair[0].dot_count() <= pair[1].dot_count());
            }
        }
    }
}

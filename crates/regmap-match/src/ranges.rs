//! # Numeric Range Extraction
//!
//! Scans paragraph text for floor-area and occupancy constraints. Each
//! dimension has three pattern families, all evaluated on every paragraph:
//!
//! | Family    | Hebrew               | English                      |
//! |-----------|----------------------|------------------------------|
//! | range     | `בין 50 ל-100 מ"ר`    | `between 50 and 100 m2`      |
//! | threshold | `מעל 100 מ"ר`, `עד 50 איש` | `at least 100 m2`, `up to 50 seats` |
//! | exact     | `120 מ"ר`            | `120 sqm`                    |
//!
//! Range matches are applied first and threshold matches override them, so
//! a later, more specific bound wins. A negated threshold phrase flips its
//! direction ("not more than" is a maximum). Exact values are deduplicated
//! and sorted.
//!
//! Numbers are integers, optionally with `,` thousands separators. A match
//! whose number fails to parse is skipped and the scan continues.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::MatchResult;

const NUM: &str = r"([0-9]{1,3}(?:,[0-9]{3})+|[0-9]+)";

const SIZE_UNIT: &str =
    r#"(?:מ["\x{05F4}\x{05F3}]?ר|מטר|m2|m²|sqm|sq\.?\s?m|square\s+met(?:er|re)s?)"#;

const OCCUPANCY_UNIT: &str =
    r"(?:איש|אנשים|מקומות?|seats?|persons?|people|occupants?|guests?)";

/// A whole-word negation: `לא` inside `אלא` or `ללא` is not one.
const NEGATION: &str = r"(?P<neg>\b(?:לא|not|no)\s+)?";

const MIN_WORDS: &str = r"מעל|יותר\s*מ[־\-]?|לפחות|החל\s*מ[־\-]?|\bover|\babove|\bmore\s+than|\bat\s+least|\bexceeding|\bstarting\s+(?:at|from)|\bminimum\s+of";

const MAX_WORDS: &str = r"עד|לא\s*יעלה\s*על|פחות\s*מ[־\-]?|\bup\s+to|\bless\s+than|\bunder|\bbelow|\bat\s+most|\bmaximum\s+of";

const SIZE_EXACT_LEAD: &str = r"(?:^|[^א-ת])";

const OCCUPANCY_EXACT_LEAD: &str = r"(?:תפוסה\s*של|מיועד\s*ל[־\-]?|\bcapacity\s+of|\boccupancy\s+of|\bdesigned\s+for|\bintended\s+for)\s*";

/// Constraints on one dimension found in a paragraph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub exact: Vec<f64>,
}

impl Constraint {
    /// Whether the paragraph states any constraint on this dimension.
    pub fn is_declared(&self) -> bool {
        self.min.is_some() || self.max.is_some() || !self.exact.is_empty()
    }

    /// Whether `value` lies within the declared min/max bounds.
    pub fn admits(&self, value: f64) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
}

/// Size and occupancy constraints of one paragraph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericRanges {
    pub size_m2: Constraint,
    pub occupancy: Constraint,
}

impl NumericRanges {
    pub fn is_empty(&self) -> bool {
        !self.size_m2.is_declared() && !self.occupancy.is_declared()
    }
}

/// The compiled pattern families for one dimension.
#[derive(Debug, Clone)]
struct PatternFamily {
    dimension: &'static str,
    ranges: Vec<Regex>,
    threshold: Regex,
    exact: Regex,
    /// Reject an exact match directly followed by a letter.
    exact_needs_boundary: bool,
}

impl PatternFamily {
    fn compile(
        dimension: &'static str,
        unit: &str,
        exact_lead: &str,
        exact_needs_boundary: bool,
    ) -> MatchResult<Self> {
        let ranges = vec![
            Regex::new(&format!(
                r"(?i)(?:בין|\bbetween)\s+{NUM}\s+(?:ל[־\-]?|and\s+){NUM}\s*{unit}"
            ))?,
            Regex::new(&format!(
                r"(?i)(?:^|[^.\d]){NUM}(?:[־\-–—]|\s*\bto\b\s*){NUM}\s*{unit}"
            ))?,
        ];
        let threshold = Regex::new(&format!(
            r"(?i){NEGATION}(?:(?P<min>{MIN_WORDS})|(?P<max>{MAX_WORDS}))\s*{NUM}\s*{unit}"
        ))?;
        let exact = Regex::new(&format!(r"(?i){exact_lead}{NUM}\s*{unit}"))?;
        Ok(Self {
            dimension,
            ranges,
            threshold,
            exact,
            exact_needs_boundary,
        })
    }

    fn scan(&self, text: &str) -> Constraint {
        let mut out = Constraint::default();

        for pattern in &self.ranges {
            for caps in pattern.captures_iter(text) {
                if let (Some(lo), Some(hi)) = (self.number(&caps, 1), self.number(&caps, 2)) {
                    out.min = Some(lo);
                    out.max = Some(hi);
                }
            }
        }

        for caps in self.threshold.captures_iter(text) {
            // Group 1 is `neg`; the number follows the min/max alternation.
            let Some(value) = self.last_number(&caps) else {
                continue;
            };
            let is_min = caps.name("min").is_some();
            let negated = caps.name("neg").is_some();
            if is_min != negated {
                out.min = Some(value);
            } else {
                out.max = Some(value);
            }
        }

        for caps in self.exact.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            if self.exact_needs_boundary
                && text[whole.end()..]
                    .chars()
                    .next()
                    .is_some_and(char::is_alphabetic)
            {
                continue;
            }
            if let Some(value) = self.number(&caps, 1) {
                out.exact.push(value);
            }
        }
        out.exact.sort_by(f64::total_cmp);
        out.exact.dedup();
        out
    }

    fn number(&self, caps: &Captures<'_>, group: usize) -> Option<f64> {
        let raw = caps.get(group)?.as_str();
        match raw.replace(',', "").parse::<f64>() {
            Ok(v) => Some(v),
            Err(e) => {
                debug!(dimension = self.dimension, raw, error = %e, "unparseable number skipped");
                None
            }
        }
    }

    fn last_number(&self, caps: &Captures<'_>) -> Option<f64> {
        let group = caps.len().checked_sub(1)?;
        self.number(caps, group)
    }
}

/// Compiled size and occupancy pattern families.
#[derive(Debug, Clone)]
pub struct RangeExtractor {
    size: PatternFamily,
    occupancy: PatternFamily,
}

impl RangeExtractor {
    pub fn new() -> MatchResult<Self> {
        Ok(Self {
            size: PatternFamily::compile("size_m2", SIZE_UNIT, SIZE_EXACT_LEAD, true)?,
            occupancy: PatternFamily::compile(
                "occupancy",
                OCCUPANCY_UNIT,
                OCCUPANCY_EXACT_LEAD,
                false,
            )?,
        })
    }

    /// Extract every size and occupancy constraint stated in `text`.
    pub fn extract_numeric_ranges(&self, text: &str) -> NumericRanges {
        NumericRanges {
            size_m2: self.size.scan(text),
            occupancy: self.occupancy.scan(text),
        }
    }
}

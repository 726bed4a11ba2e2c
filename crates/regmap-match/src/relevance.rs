//! # Relevance Scoring
//!
//! Three pure functions over one paragraph:
//!
//! - [`matches_numeric_requirements`]: the hard numeric gate.
//! - [`assess_requirement_relevance`]: a score in `[0, 1]`.
//! - [`priority_for`]: high / medium / low.
//!
//! ## Score composition
//!
//! | Component                    | Weight                          |
//! |------------------------------|---------------------------------|
//! | base                         | 0.3                             |
//! | size constraint satisfied    | up to 0.4                       |
//! | occupancy constraint satisfied | up to 0.4                     |
//! | selected feature keyword hit | 0.2 per feature                 |
//! | meat-service alignment       | 0.1                             |
//! | safety or emergency term     | 0.3                             |
//! | numeric gate failed          | whole score × 0.2               |
//!
//! The result is clamped to `[0, 1]`.

use serde::{Deserialize, Serialize};

use regmap_pack::{FeatureConfigSet, Haystack};

use crate::profile::BusinessProfile;
use crate::ranges::{Constraint, NumericRanges};

pub const BASE_SCORE: f64 = 0.3;
pub const MIN_MET_CREDIT: f64 = 0.2;
pub const MAX_MET_CREDIT: f64 = 0.2;
pub const EXACT_NEAR_CREDIT: f64 = 0.3;
/// Per-dimension cap on constraint credit.
pub const DIMENSION_CAP: f64 = 0.4;
/// Relative distance within which an exact value counts as near.
pub const EXACT_TOLERANCE: f64 = 0.3;
pub const FEATURE_CREDIT: f64 = 0.2;
pub const MEAT_CREDIT: f64 = 0.1;
pub const SAFETY_CREDIT: f64 = 0.3;
pub const GATE_PENALTY: f64 = 0.2;

pub const HIGH_THRESHOLD: f64 = 0.8;
pub const MEDIUM_THRESHOLD: f64 = 0.5;

/// Terms that earn the safety credit. Matched against lowercased text.
pub const SAFETY_TERMS: &[&str] = &[
    "חירום",
    "בטיחות",
    "כיבוי",
    "מתזים",
    "גלאי",
    "emergency",
    "safety",
    "fire",
    "sprinkler",
    "detector",
];

/// Terms that force high priority.
pub const PRIORITY_TERMS: &[&str] = &["חירום", "בטיחות", "כיבוי", "emergency", "safety"];

/// Terms that align a paragraph with meat service.
pub const MEAT_TERMS: &[&str] = &["בשר", "כשר", "meat", "kosher"];

/// Requirement priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn contains_any(lowered: &str, terms: &[&str]) -> bool {
    terms.iter().any(|t| lowered.contains(t))
}

/// Hard gate: the profile must fall inside every declared bound, and a
/// declared dimension cannot be satisfied by an unknown (zero) value.
pub fn matches_numeric_requirements(profile: &BusinessProfile, ranges: &NumericRanges) -> bool {
    dimension_passes(profile.size(), &ranges.size_m2)
        && dimension_passes(profile.seat_count(), &ranges.occupancy)
}

fn dimension_passes(value: f64, constraint: &Constraint) -> bool {
    if !constraint.is_declared() {
        return true;
    }
    value != 0.0 && constraint.admits(value)
}

fn dimension_credit(value: f64, constraint: &Constraint) -> f64 {
    if value <= 0.0 || !constraint.is_declared() {
        return 0.0;
    }
    let mut credit = 0.0;
    if constraint.min.is_some_and(|min| value >= min) {
        credit += MIN_MET_CREDIT;
    }
    if constraint.max.is_some_and(|max| value <= max) {
        credit += MAX_MET_CREDIT;
    }
    if constraint
        .exact
        .iter()
        .any(|e| (value - e).abs() <= value * EXACT_TOLERANCE)
    {
        credit += EXACT_NEAR_CREDIT;
    }
    credit.min(DIMENSION_CAP)
}

/// Score how relevant `text` is to `profile`.
///
/// `features` supplies the keyword rules of dynamically configured
/// features; only those present among the profile's attributes count.
pub fn assess_requirement_relevance(
    text: &str,
    profile: &BusinessProfile,
    ranges: &NumericRanges,
    features: &FeatureConfigSet,
) -> f64 {
    if text.is_empty() {
        return 0.0;
    }
    let haystack = Haystack::new(text);
    let lowered = text.to_lowercase();

    let mut score = BASE_SCORE;
    score += dimension_credit(profile.size(), &ranges.size_m2);
    score += dimension_credit(profile.seat_count(), &ranges.occupancy);

    for (name, scope) in features.iter() {
        if !profile.has_attribute(name) {
            continue;
        }
        if scope.rules().iter().any(|rule| rule.matches(&haystack)) {
            score += FEATURE_CREDIT;
        }
    }

    if profile.serves_meat && contains_any(&lowered, MEAT_TERMS) {
        score += MEAT_CREDIT;
    }
    if contains_any(&lowered, SAFETY_TERMS) {
        score += SAFETY_CREDIT;
    }
    if !matches_numeric_requirements(profile, ranges) {
        score *= GATE_PENALTY;
    }
    score.clamp(0.0, 1.0)
}

/// Priority from relevance, with safety and emergency text always high.
pub fn priority_for(relevance: f64, text: &str) -> Priority {
    if relevance >= HIGH_THRESHOLD || contains_any(&text.to_lowercase(), PRIORITY_TERMS) {
        Priority::High
    } else if relevance >= MEDIUM_THRESHOLD {
        Priority::Medium
    } else {
        Priority::Low
    }
}

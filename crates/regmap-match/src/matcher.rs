//! # Requirement Matcher
//!
//! Scores every mapped paragraph against a [`BusinessProfile`] and returns a
//! prioritized, category-grouped list.
//!
//! ## Flow
//!
//! 1. [`Matcher::get_applicable_features`] selects features for the profile.
//! 2. For each applicable feature, every `(category, paragraph)` in its
//!    mapping is looked up. Missing text is skipped.
//! 3. Paragraphs that fail the numeric gate are dropped.
//! 4. Remaining paragraphs are scored and filtered by `min_relevance`.
//! 5. A paragraph reached through two features is reported once per feature.
//!
//! A [`Matcher`] holds only immutable state and is `Send + Sync`; calls
//! allocate their own result and need no locking.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::MatchResult;
use crate::profile::BusinessProfile;
use crate::ranges::{NumericRanges, RangeExtractor};
use crate::relevance::{
    assess_requirement_relevance, matches_numeric_requirements, priority_for, Priority,
};
use crate::store::ArtifactStore;

/// Default relevance threshold.
pub const DEFAULT_MIN_RELEVANCE: f64 = 0.3;

/// Value of [`MatchedRequirement::source`] for mapping-derived entries.
pub const SOURCE_FEATURE_MAPPING: &str = "feature_mapping";

/// Feature-name markers for size-related features (always applicable).
pub const SIZE_MARKERS: &[&str] = &["מ\"ר", "שטח", "size", "area"];
/// Feature-name markers for occupancy-related features (always applicable).
pub const OCCUPANCY_MARKERS: &[&str] = &["תפוסה", "איש", "seats", "seating", "occupancy"];
/// Feature-name markers for safety-related features (always applicable).
pub const SAFETY_MARKERS: &[&str] = &["בטיחות", "כיבוי", "safety", "fire"];

const SMALL_BUSINESS_M2: f64 = 100.0;
const LOW_OCCUPANCY_SEATS: f64 = 50.0;

/// One paragraph matched through one feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedRequirement {
    pub category: String,
    pub paragraph_number: String,
    pub text: String,
    pub relevance_score: f64,
    pub matched_features: Vec<String>,
    pub source: String,
    pub numeric_ranges: NumericRanges,
    pub priority: Priority,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityBreakdown {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl PriorityBreakdown {
    pub fn total(&self) -> usize {
        self.high + self.medium + self.low
    }

    fn record(&mut self, priority: Priority) {
        match priority {
            Priority::High => self.high += 1,
            Priority::Medium => self.medium += 1,
            Priority::Low => self.low += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeCategory {
    Small,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OccupancyCategory {
    Low,
    High,
}

/// Coarse classification of the requesting business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileClass {
    pub size_category: SizeCategory,
    pub occupancy_category: OccupancyCategory,
    pub special_requirements: bool,
}

impl ProfileClass {
    pub fn of(profile: &BusinessProfile) -> Self {
        Self {
            size_category: if profile.size() < SMALL_BUSINESS_M2 {
                SizeCategory::Small
            } else {
                SizeCategory::Large
            },
            occupancy_category: if profile.seat_count() < LOW_OCCUPANCY_SEATS {
                OccupancyCategory::Low
            } else {
                OccupancyCategory::High
            },
            special_requirements: profile.uses_gas || profile.serves_meat,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub categories_count: usize,
    pub priority_breakdown: PriorityBreakdown,
    pub avg_relevance: f64,
    pub business_profile: ProfileClass,
}

/// Full result of one matching call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    /// Every match, most relevant first.
    pub matched_requirements: Vec<MatchedRequirement>,
    /// Matches grouped by category; only non-empty categories appear.
    pub by_category: BTreeMap<String, Vec<MatchedRequirement>>,
    /// The applicable features, sorted.
    pub feature_coverage: Vec<String>,
    pub user_profile: BusinessProfile,
    pub total_matches: usize,
    pub summary: MatchSummary,
}

/// Bring a caller-supplied threshold into `[0, 1]`.
pub fn clamp_min_relevance(min_relevance: f64) -> f64 {
    if min_relevance.is_nan() {
        warn!("NaN min_relevance, using default {DEFAULT_MIN_RELEVANCE}");
        DEFAULT_MIN_RELEVANCE
    } else if min_relevance < 0.0 {
        warn!(min_relevance, "min_relevance < 0.0, clamping to 0.0");
        0.0
    } else if min_relevance > 1.0 {
        warn!(min_relevance, "min_relevance > 1.0, clamping to 1.0");
        1.0
    } else {
        min_relevance
    }
}

/// Requirement matcher over one loaded build.
#[derive(Debug, Clone)]
pub struct Matcher {
    store: Arc<ArtifactStore>,
    ranges: RangeExtractor,
}

impl Matcher {
    pub fn new(store: Arc<ArtifactStore>) -> MatchResult<Self> {
        Ok(Self {
            store,
            ranges: RangeExtractor::new()?,
        })
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    pub fn extract_numeric_ranges(&self, text: &str) -> NumericRanges {
        self.ranges.extract_numeric_ranges(text)
    }

    /// Mapped features that apply to `profile`, sorted by name.
    pub fn get_applicable_features(&self, profile: &BusinessProfile) -> Vec<String> {
        let mut applicable: Vec<String> = self
            .store
            .feature_mapping()
            .feature_names()
            .filter(|name| self.is_applicable(name, profile))
            .map(str::to_string)
            .collect();
        applicable.sort();
        applicable
    }

    fn is_applicable(&self, feature: &str, profile: &BusinessProfile) -> bool {
        let lowered = feature.to_lowercase();
        let has = |markers: &[&str]| markers.iter().any(|m| lowered.contains(m));
        if has(SIZE_MARKERS) || has(OCCUPANCY_MARKERS) || has(SAFETY_MARKERS) {
            return true;
        }
        let configured = self
            .store
            .features()
            .names()
            .find(|name| lowered.contains(&name.to_lowercase()));
        match configured {
            Some(name) => profile.has_attribute(name),
            None => true,
        }
    }

    /// Normalize raw request input, then match.
    pub fn match_answers(&self, answers: &Value, min_relevance: f64) -> MatchResult<MatchReport> {
        let profile = BusinessProfile::from_value(answers)?;
        Ok(self.match_requirements(&profile, min_relevance))
    }

    /// Score and prioritize every applicable requirement for `profile`.
    pub fn match_requirements(&self, profile: &BusinessProfile, min_relevance: f64) -> MatchReport {
        let min_relevance = clamp_min_relevance(min_relevance);
        let applicable = self.get_applicable_features(profile);
        let mapping = self.store.feature_mapping();

        let mut matched = Vec::new();
        for feature in &applicable {
            let Some(hits) = mapping.get(feature) else {
                continue;
            };
            for (category, numbers) in hits.categories() {
                for number in numbers {
                    let text = self.store.paragraph_text(category, number.as_str());
                    if text.is_empty() {
                        debug!(%category, %number, "mapped paragraph has no text");
                        continue;
                    }
                    let ranges = self.ranges.extract_numeric_ranges(text);
                    if !matches_numeric_requirements(profile, &ranges) {
                        continue;
                    }
                    let relevance =
                        assess_requirement_relevance(text, profile, &ranges, self.store.features());
                    if relevance < min_relevance {
                        continue;
                    }
                    matched.push(MatchedRequirement {
                        category: category.clone(),
                        paragraph_number: number.to_string(),
                        text: text.to_string(),
                        relevance_score: relevance,
                        matched_features: vec![feature.clone()],
                        source: SOURCE_FEATURE_MAPPING.to_string(),
                        numeric_ranges: ranges,
                        priority: priority_for(relevance, text),
                    });
                }
            }
        }

        matched.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));

        let mut by_category: BTreeMap<String, Vec<MatchedRequirement>> = BTreeMap::new();
        for req in &matched {
            by_category
                .entry(req.category.clone())
                .or_default()
                .push(req.clone());
        }
        for bucket in by_category.values_mut() {
            bucket.sort_by(|a, b| {
                b.relevance_score
                    .total_cmp(&a.relevance_score)
                    .then_with(|| b.paragraph_number.cmp(&a.paragraph_number))
            });
        }

        let mut breakdown = PriorityBreakdown::default();
        for req in &matched {
            breakdown.record(req.priority);
        }
        let avg_relevance = if matched.is_empty() {
            0.0
        } else {
            matched.iter().map(|r| r.relevance_score).sum::<f64>() / matched.len() as f64
        };

        debug!(
            features = applicable.len(),
            matches = matched.len(),
            "requirements matched"
        );

        MatchReport {
            total_matches: matched.len(),
            summary: MatchSummary {
                categories_count: by_category.len(),
                priority_breakdown: breakdown,
                avg_relevance,
                business_profile: ProfileClass::of(profile),
            },
            matched_requirements: matched,
            by_category,
            feature_coverage: applicable,
            user_profile: profile.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regmap_core::{FeatureHits, FeatureMapping, ParagraphNumber, ParagraphTree};
    use regmap_pack::FeatureConfigSet;
    use serde_json::json;

    const HEALTH: &str = "משרד הבריאות";
    const FIRE: &str = "כבאות";

    fn num(s: &str) -> ParagraphNumber {
        ParagraphNumber::parse(s).unwrap()
    }

    fn store() -> Arc<ArtifactStore> {
        let mut tree = ParagraphTree::new();
        tree.add_text(HEALTH, &num("1"), "");
        tree.add_text(HEALTH, &num("1.1"), "1.1 עסק ששטחו מעל 100 מ\"ר יתקין כיור נוסף");
        tree.add_text(HEALTH, &num("1.2"), "1.2 הפרדה בין בשר לחלב");
        tree.add_text(HEALTH, &num("1.3"), "1.3 משלוח מזון בקירור");
        tree.add_text(FIRE, &num("5"), "");
        tree.add_text(FIRE, &num("5.1"), "5.1 מטף כיבוי בכל עסק");
        tree.add_text(FIRE, &num("5.2"), "5.2 תפוסה עד 50 איש");
        tree.add_text(FIRE, &num("5.3"), "5.3 גז בישול יאוחסן מחוץ למבנה");

        let mut mapping = FeatureMapping::new();
        let mut add = |feature: &str, category: &str, numbers: &[&str]| {
            let mut hits = mapping.get(feature).cloned().unwrap_or_default();
            hits.insert_hits(category, numbers.iter().map(|n| num(n)));
            mapping.insert(feature, hits);
        };
        add("size", HEALTH, &["1.1"]);
        add("meat", HEALTH, &["1.2"]);
        add("delivery", HEALTH, &["1.3"]);
        add("fire_safety", FIRE, &["5.1"]);
        add("seats", FIRE, &["5.2"]);
        add("gas", FIRE, &["5.3"]);
        add("gas", HEALTH, &["1.9"]);

        let features = FeatureConfigSet::from_value(&json!({
            "size": {"keywords": ["מ\"ר"]},
            "meat": {"keywords": ["בשר"]},
            "delivery": {"keywords": ["משלוח"]},
            "fire_safety": {"keywords": ["כיבוי"]},
            "seats": {"keywords": ["תפוסה"]},
            "gas": {"keywords": ["גז"]}
        }))
        .unwrap();
        Arc::new(ArtifactStore::new(tree, mapping, features))
    }

    fn matcher() -> Matcher {
        Matcher::new(store()).unwrap()
    }

    fn profile(value: Value) -> BusinessProfile {
        BusinessProfile::from_value(&value).unwrap()
    }

    #[test]
    fn applicable_features_follow_markers_then_attributes() {
        let m = matcher();
        let p = profile(json!({"attributes": ["gas"]}));
        assert_eq!(
            m.get_applicable_features(&p),
            vec!["fire_safety", "gas", "seats", "size"]
        );
        let p = profile(json!({"attributes": ["delivery", "meat"]}));
        assert_eq!(
            m.get_applicable_features(&p),
            vec!["delivery", "fire_safety", "meat", "seats", "size"]
        );
    }

    #[test]
    fn unconfigured_features_are_applicable() {
        let mut mapping = FeatureMapping::new();
        let mut hits = FeatureHits::new();
        hits.insert_hits(HEALTH, vec![num("1.1")]);
        mapping.insert("signage", hits);
        let store = ArtifactStore::new(ParagraphTree::new(), mapping, FeatureConfigSet::default());
        let m = Matcher::new(Arc::new(store)).unwrap();
        assert_eq!(m.get_applicable_features(&BusinessProfile::default()), vec!["signage"]);
    }

    #[test]
    fn small_business_without_attributes() {
        let m = matcher();
        let report = m.match_requirements(&profile(json!({"size_m2": 80, "seats": 30})), 0.0);
        // 1.1 needs more than 100 m2; 5.2 allows up to 50 seats.
        let numbers: Vec<_> = report
            .matched_requirements
            .iter()
            .map(|r| r.paragraph_number.as_str())
            .collect();
        assert_eq!(numbers, vec!["5.1", "5.2"]);
        assert_eq!(report.total_matches, 2);
        assert_eq!(report.feature_coverage, vec!["fire_safety", "seats", "size"]);

        let first = &report.matched_requirements[0];
        assert_eq!(first.category, FIRE);
        assert_eq!(first.matched_features, vec!["fire_safety"]);
        assert_eq!(first.source, SOURCE_FEATURE_MAPPING);
        assert_eq!(first.priority, Priority::High);
        assert!((first.relevance_score - 0.6).abs() < 1e-9);

        let second = &report.matched_requirements[1];
        assert_eq!(second.numeric_ranges.occupancy.max, Some(50.0));
        assert!((second.relevance_score - 0.5).abs() < 1e-9);
        assert_eq!(second.priority, Priority::Medium);
    }

    #[test]
    fn unknown_size_is_gated_out() {
        let m = matcher();
        let report = m.match_requirements(&profile(json!({"size_m2": 0, "seats": 0})), 0.0);
        assert!(report
            .matched_requirements
            .iter()
            .all(|r| r.paragraph_number != "1.1" && r.paragraph_number != "5.2"));
    }

    #[test]
    fn large_business_with_meat_and_gas() {
        let m = matcher();
        let p = profile(json!({"size_m2": "150", "seating": 40, "attributes": ["בשר", "gas"]}));
        assert!(p.uses_gas && p.serves_meat);
        let report = m.match_requirements(&p, 0.3);

        let hits: Vec<_> = report
            .matched_requirements
            .iter()
            .map(|r| (r.category.as_str(), r.paragraph_number.as_str()))
            .collect();
        assert!(hits.contains(&(HEALTH, "1.1")));
        assert!(hits.contains(&(FIRE, "5.3")));
        // "1.9" is mapped for gas but has no text.
        assert!(!hits.contains(&(HEALTH, "1.9")));
        // Meat service came from a synonym; the `meat` feature key is absent.
        assert!(!report.feature_coverage.contains(&"meat".to_string()));

        assert!(report
            .matched_requirements
            .windows(2)
            .all(|w| w[0].relevance_score >= w[1].relevance_score));
        assert_eq!(report.summary.business_profile.size_category, SizeCategory::Large);
        assert_eq!(report.summary.business_profile.occupancy_category, OccupancyCategory::Low);
        assert!(report.summary.business_profile.special_requirements);
    }

    #[test]
    fn feature_keyword_credit_applies_to_selected_features() {
        let m = matcher();
        let report = m.match_requirements(&profile(json!({"attributes": ["delivery"]})), 0.0);
        let delivery = report
            .matched_requirements
            .iter()
            .find(|r| r.paragraph_number == "1.3")
            .unwrap();
        assert!((delivery.relevance_score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn threshold_filters_low_scores() {
        let m = matcher();
        let p = profile(json!({"size_m2": 80, "seats": 30}));
        let all = m.match_requirements(&p, 0.0);
        let strict = m.match_requirements(&p, 0.55);
        assert!(strict.total_matches < all.total_matches);
        assert!(strict
            .matched_requirements
            .iter()
            .all(|r| r.relevance_score >= 0.55));
    }

    #[test]
    fn out_of_range_threshold_is_clamped() {
        assert_eq!(clamp_min_relevance(-1.0), 0.0);
        assert_eq!(clamp_min_relevance(3.0), 1.0);
        assert_eq!(clamp_min_relevance(f64::NAN), DEFAULT_MIN_RELEVANCE);
        assert_eq!(clamp_min_relevance(0.4), 0.4);
    }

    #[test]
    fn buckets_and_summary_are_consistent() {
        let m = matcher();
        let p = profile(json!({"size_m2": 150, "seats": 40, "attributes": ["gas", "meat", "delivery"]}));
        let report = m.match_requirements(&p, 0.0);
        let bucketed: usize = report.by_category.values().map(Vec::len).sum();
        assert_eq!(bucketed, report.total_matches);
        assert_eq!(report.summary.priority_breakdown.total(), report.total_matches);
        assert_eq!(report.summary.categories_count, report.by_category.len());
        assert!(report.by_category.values().all(|b| !b.is_empty()));
        for bucket in report.by_category.values() {
            assert!(bucket.windows(2).all(|w| {
                w[0].relevance_score > w[1].relevance_score
                    || (w[0].relevance_score == w[1].relevance_score
                        && w[0].paragraph_number >= w[1].paragraph_number)
            }));
        }
    }

    #[test]
    fn empty_report_has_zero_average() {
        let m = matcher();
        let report = m.match_requirements(&BusinessProfile::default(), 1.0);
        assert_eq!(report.total_matches, 0);
        assert_eq!(report.summary.avg_relevance, 0.0);
        assert!(report.by_category.is_empty());
    }

    #[test]
    fn match_answers_rejects_non_object() {
        let m = matcher();
        assert!(m.match_answers(&json!("restaurant"), 0.3).is_err());
        assert!(m.match_answers(&json!({"size_m2": 120}), 0.3).is_ok());
    }

    #[test]
    fn report_serializes_with_lowercase_enums() {
        let m = matcher();
        let report = m.match_requirements(&profile(json!({"size_m2": 80, "seats": 30})), 0.0);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["summary"]["business_profile"]["size_category"], "small");
        assert_eq!(value["matched_requirements"][0]["priority"], "high");
        assert_eq!(value["total_matches"], 2);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn report_invariants_hold(
                size in proptest::option::of(0u32..400),
                seats in proptest::option::of(0u32..200),
                attrs in proptest::sample::subsequence(vec!["gas", "meat", "delivery", "בשר"], 0..4),
                min in 0.0f64..1.0,
            ) {
                let m = matcher();
                let p = profile(json!({"size_m2": size, "seats": seats, "attributes": attrs}));
                let a = m.match_requirements(&p, min);
                let b = m.match_requirements(&p, min);
                prop_assert_eq!(&a, &b);
                prop_assert_eq!(a.summary.priority_breakdown.total(), a.total_matches);
                for r in &a.matched_requirements {
                    prop_assert!((0.0..=1.0).contains(&r.relevance_score));
                    prop_assert!(r.relevance_score >= min);
                }
            }
        }
    }
}

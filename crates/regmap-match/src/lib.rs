//! # regmap-match — Requirement Matcher
//!
//! The online half of regmap. Loads the artifacts written by
//! `regmap-pack` once per process and scores them against business
//! profiles.
//!
//! - [`profile`]: request input normalization.
//! - [`ranges`]: bilingual size and occupancy constraint extraction.
//! - [`relevance`]: numeric gate, relevance score, priority.
//! - [`store`]: loaded artifacts and the memoizing cache.
//! - [`matcher`]: applicability and `match_requirements`.
//!
//! ## Example
//!
//! ```no_run
//! use regmap_match::{ArtifactCache, Matcher};
//!
//! # fn main() -> Result<(), regmap_match::MatchError> {
//! let cache = ArtifactCache::new("out", Some("features.json".into()));
//! let matcher = Matcher::new(cache.get_or_load()?)?;
//! let report = matcher.match_answers(&serde_json::json!({"size_m2": 120}), 0.3)?;
//! println!("{} matches", report.total_matches);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod matcher;
pub mod profile;
pub mod ranges;
pub mod relevance;
pub mod store;

pub use error::{MatchError, MatchResult};
pub use matcher::{
    clamp_min_relevance, MatchReport, MatchSummary, MatchedRequirement, Matcher,
    OccupancyCategory, PriorityBreakdown, ProfileClass, SizeCategory, DEFAULT_MIN_RELEVANCE,
};
pub use profile::{normalize_user_input, BusinessProfile};
pub use ranges::{Constraint, NumericRanges, RangeExtractor};
pub use relevance::{
    assess_requirement_relevance, matches_numeric_requirements, priority_for, Priority,
};
pub use store::{ArtifactCache, ArtifactStore};

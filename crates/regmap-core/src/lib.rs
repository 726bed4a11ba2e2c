//! # regmap-core — Foundational Types for regmap
//!
//! This crate is the leaf of the regmap workspace. It defines the data model
//! shared by the offline build pipeline and the online requirement matcher:
//!
//! - [`ParagraphNumber`]: a validated dotted numeric path (`4.6.3`) with at
//!   most [`MAX_PARAGRAPH_DEPTH`] segments, ordered by segment count and then
//!   lexicographically.
//! - [`ParagraphNode`] / [`ParagraphTree`]: the per-category hierarchy of
//!   numbered clauses. Every ancestor prefix of a node exists as its own node.
//! - [`FeatureHits`] / [`FeatureMapping`]: feature name to matching paragraph
//!   numbers, per category. The union list is always derived, never stored.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `regmap-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Persisted shapes are produced by `serde` derive and round-trip through
//!   `serde_json` without loss.

pub mod error;
pub mod mapping;
pub mod number;
pub mod tree;

pub use error::CoreError;
pub use mapping::{FeatureHits, FeatureMapping};
pub use number::{canonicalize_number, sorted_unique, ParagraphNumber, MAX_PARAGRAPH_DEPTH};
pub use tree::{ParagraphNode, ParagraphTree};

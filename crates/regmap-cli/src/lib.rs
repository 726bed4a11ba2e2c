//! # regmap-cli — Command-Line Interface
//!
//! Provides the `regmap` binary.
//!
//! ## Subcommands
//!
//! - `regmap build`: document + feature configuration → artifacts.
//! - `regmap verify`: compare two artifact directories.
//! - `regmap match`: score requirements for a business profile.
//! - `regmap features`: list the features applicable to a profile.
//!
//! ```bash
//! regmap build --input rules.pdf --verify-with rules.docx --features features.yaml
//! regmap match --profile restaurant.json --pretty
//! ```
//!
//! Exit codes: `0` success, `1` verification mismatch or operational error.

pub mod build;
pub mod config;
pub mod requirements;
pub mod verify;

pub use config::RegmapConfig;

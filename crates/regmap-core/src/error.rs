//! # Error Types
//!
//! Errors raised while constructing core data-model values. Everything else
//! in the workspace wraps these through `#[from]` conversions.

use thiserror::Error;

/// Top-level error type for `regmap-core`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The input is not a dotted sequence of decimal digit groups.
    #[error("invalid paragraph number {input:?}: {reason}")]
    InvalidParagraphNumber {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The input has more segments than the tree supports.
    #[error("paragraph number {input:?} has {depth} segments; maximum is {max}")]
    ParagraphTooDeep {
        /// The rejected input.
        input: String,
        /// Number of dot-separated segments found.
        depth: usize,
        /// Configured maximum.
        max: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_number_display_includes_input() {
        let err = CoreError::InvalidParagraphNumber {
            input: "4..1".to_string(),
            reason: "empty segment".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("4..1"));
        assert!(msg.contains("empty segment"));
    }

    #[test]
    fn too_deep_display_includes_limits() {
        let err = CoreError::ParagraphTooDeep {
            input: "1.2".to_string(),
            depth: 21,
            max: 20,
        };
        let msg = format!("{err}");
        assert!(msg.contains("21"));
        assert!(msg.contains("20"));
    }
}

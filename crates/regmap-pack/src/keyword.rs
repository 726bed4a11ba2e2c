//! # Keyword Rules
//!
//! A feature selects paragraphs through a list of keyword rules. Each rule
//! is either a literal (case-insensitive substring) or a compiled pattern.
//!
//! ## Configuration Items
//!
//! ```json
//! ["גז", {"regex": true, "pattern": "מ\"ר\\s*\\d+", "flags": ["I", "M"]}]
//! ```
//!
//! Pattern flags use the familiar single-letter or long names:
//! `I`/`IGNORECASE`, `M`/`MULTILINE`, `S`/`DOTALL`, `X`/`VERBOSE`,
//! `U`/`UNICODE`, `A`/`ASCII`. A missing `flags` list means `["I"]`, and a
//! list that sets no flag at all also falls back to case-insensitive.
//!
//! A rule that cannot be compiled (invalid pattern, unknown flag) is
//! dropped with a `debug!` record. The remaining rules of the feature still
//! apply.

use regex::{Regex, RegexBuilder};
use serde_json::Value;
use tracing::debug;

/// Text prepared once for repeated rule evaluation.
#[derive(Debug, Clone)]
pub struct Haystack<'a> {
    text: &'a str,
    lowered: String,
}

impl<'a> Haystack<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            lowered: text.to_lowercase(),
        }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }
}

/// One compiled keyword rule.
#[derive(Debug, Clone)]
pub enum KeywordRule {
    /// Substring match. `text` is stored lowercased when case-insensitive.
    Literal { text: String, case_insensitive: bool },
    /// Unanchored regex search.
    Pattern(Regex),
}

impl KeywordRule {
    /// A case-insensitive literal.
    pub fn literal(text: &str) -> Self {
        Self::Literal {
            text: text.to_lowercase(),
            case_insensitive: true,
        }
    }

    /// A case-sensitive literal.
    pub fn literal_exact(text: &str) -> Self {
        Self::Literal {
            text: text.to_string(),
            case_insensitive: false,
        }
    }

    /// Whether the rule matches anywhere in the haystack.
    pub fn matches(&self, haystack: &Haystack<'_>) -> bool {
        match self {
            Self::Literal {
                text,
                case_insensitive: true,
            } => haystack.lowered.contains(text.as_str()),
            Self::Literal {
                text,
                case_insensitive: false,
            } => haystack.text.contains(text.as_str()),
            Self::Pattern(re) => re.is_match(haystack.text),
        }
    }

    /// Compile one configuration item. `None` means the item is skipped.
    pub fn from_value(item: &Value) -> Option<Self> {
        match item {
            Value::String(s) if !s.is_empty() => Some(Self::literal(s)),
            Value::Object(obj) if obj.get("regex") == Some(&Value::Bool(true)) => {
                let pattern = match obj.get("pattern") {
                    Some(Value::String(p)) => p,
                    _ => {
                        debug!(item = %item, "pattern rule without a string pattern skipped");
                        return None;
                    }
                };
                let flags = match PatternFlags::from_value(obj.get("flags")) {
                    Ok(flags) => flags,
                    Err(flag) => {
                        debug!(pattern, flag, "pattern rule with unrecognized flag skipped");
                        return None;
                    }
                };
                match flags.compile(pattern) {
                    Ok(re) => Some(Self::Pattern(re)),
                    Err(e) => {
                        debug!(pattern, error = %e, "invalid pattern rule skipped");
                        None
                    }
                }
            }
            other => {
                debug!(item = %other, "unrecognized keyword item skipped");
                None
            }
        }
    }
}

/// Parsed pattern flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct PatternFlags {
    ignore_case: bool,
    multi_line: bool,
    dot_all: bool,
    verbose: bool,
    ascii: bool,
    any_set: bool,
}

impl PatternFlags {
    /// Parse the `flags` value. `Err` carries the first unrecognized name.
    fn from_value(value: Option<&Value>) -> Result<Self, String> {
        let names = match value {
            None => {
                return Ok(Self {
                    ignore_case: true,
                    any_set: true,
                    ..Self::default()
                })
            }
            Some(Value::Array(names)) => names,
            Some(other) => return Err(other.to_string()),
        };
        let mut flags = Self::default();
        for name in names {
            let name = match name {
                Value::String(s) => s.to_ascii_uppercase(),
                other => return Err(other.to_string()),
            };
            match name.as_str() {
                "I" | "IGNORECASE" => flags.ignore_case = true,
                "M" | "MULTILINE" => flags.multi_line = true,
                "S" | "DOTALL" => flags.dot_all = true,
                "X" | "VERBOSE" => flags.verbose = true,
                "U" | "UNICODE" => {}
                "A" | "ASCII" => flags.ascii = true,
                _ => return Err(name),
            }
            flags.any_set = true;
        }
        if !flags.any_set {
            flags.ignore_case = true;
        }
        Ok(flags)
    }

    fn compile(&self, pattern: &str) -> Result<Regex, regex::Error> {
        RegexBuilder::new(pattern)
            .case_insensitive(self.ignore_case)
            .multi_line(self.multi_line)
            .dot_matches_new_line(self.dot_all)
            .ignore_whitespace(self.verbose)
            .unicode(!self.ascii)
            .build()
    }
}

/// A compiled list of keyword rules.
#[derive(Debug, Clone, Default)]
pub struct KeywordSet {
    rules: Vec<KeywordRule>,
}

impl KeywordSet {
    pub fn new(rules: Vec<KeywordRule>) -> Self {
        Self { rules }
    }

    /// Compile a configuration list. Anything other than an array yields an
    /// empty set; bad items are skipped individually.
    pub fn from_value(value: Option<&Value>) -> Self {
        let rules = match value {
            Some(Value::Array(items)) => items.iter().filter_map(KeywordRule::from_value).collect(),
            Some(Value::Null) | None => Vec::new(),
            Some(other) => {
                debug!(value = %other, "keyword list is not an array");
                Vec::new()
            }
        };
        Self { rules }
    }

    /// Concatenate two sets.
    pub fn merged(&self, other: &KeywordSet) -> KeywordSet {
        let mut rules = self.rules.clone();
        rules.extend(other.rules.iter().cloned());
        KeywordSet { rules }
    }

    /// Whether any rule matches.
    pub fn matches(&self, haystack: &Haystack<'_>) -> bool {
        self.rules.iter().any(|r| r.matches(haystack))
    }

    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

//! # Feature Configuration
//!
//! A feature configuration file maps feature names to keyword rules and the
//! categories they search. Four shapes are accepted and resolved once, at
//! load time, into the closed [`FeatureScope`] variant:
//!
//! | Shape                                                   | Scope                  |
//! |---------------------------------------------------------|------------------------|
//! | `{"categories": {cat: [kw]}, "keywords": [kw]?}`        | `PerCategoryKeywords`  |
//! | `{"category": cat, "keywords": [kw]}`                   | `SingleCategory`       |
//! | `{"search_all_categories": true, "keywords": [kw]}`     | `AllCategories`        |
//! | `{"keywords": [kw]}`                                    | `LegacyAllCategories`  |
//!
//! Shapes are checked in that order. An entry matching none of them (or not
//! an object at all) becomes a `LegacyAllCategories` scope with no rules and
//! is logged at `warn!`. A top-level value that is not an object is fatal.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::error::{PackError, PackResult};
use crate::keyword::{KeywordRule, KeywordSet};
use crate::parser::load_config_value;

/// Which categories a feature searches, with the rules for each.
#[derive(Debug, Clone)]
pub enum FeatureScope {
    /// Per-category rule lists. `global` rules apply to every listed category.
    PerCategoryKeywords {
        categories: BTreeMap<String, KeywordSet>,
        global: KeywordSet,
    },
    /// One named category.
    SingleCategory { category: String, keywords: KeywordSet },
    /// Every category, requested explicitly.
    AllCategories { keywords: KeywordSet },
    /// Every category, because no scope was given.
    LegacyAllCategories { keywords: KeywordSet },
}

impl FeatureScope {
    /// Resolve one configuration entry.
    pub fn resolve(feature: &str, cfg: &Value) -> Self {
        let Some(obj) = cfg.as_object() else {
            warn!(feature, "feature entry is not an object; it will match nothing");
            return Self::empty();
        };

        if let Some(Value::Object(categories)) = obj.get("categories") {
            return Self::PerCategoryKeywords {
                categories: categories
                    .iter()
                    .map(|(name, items)| (name.clone(), KeywordSet::from_value(Some(items))))
                    .collect(),
                global: KeywordSet::from_value(obj.get("keywords")),
            };
        }

        if obj.contains_key("category") && obj.contains_key("keywords") {
            return match obj.get("category") {
                Some(Value::String(category)) => Self::SingleCategory {
                    category: category.clone(),
                    keywords: KeywordSet::from_value(obj.get("keywords")),
                },
                _ => {
                    warn!(feature, "feature category is not a string; it will match nothing");
                    Self::empty()
                }
            };
        }

        if obj.get("search_all_categories") == Some(&Value::Bool(true)) {
            return Self::AllCategories {
                keywords: KeywordSet::from_value(obj.get("keywords")),
            };
        }

        if obj.contains_key("keywords") {
            return Self::LegacyAllCategories {
                keywords: KeywordSet::from_value(obj.get("keywords")),
            };
        }

        warn!(feature, "unrecognized feature entry shape; it will match nothing");
        Self::empty()
    }

    fn empty() -> Self {
        Self::LegacyAllCategories {
            keywords: KeywordSet::default(),
        }
    }

    /// Every rule in the scope, across all categories.
    pub fn rules(&self) -> Vec<&KeywordRule> {
        match self {
            Self::PerCategoryKeywords { categories, global } => categories
                .values()
                .flat_map(|set| set.rules())
                .chain(global.rules())
                .collect(),
            Self::SingleCategory { keywords, .. }
            | Self::AllCategories { keywords }
            | Self::LegacyAllCategories { keywords } => keywords.rules().iter().collect(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::PerCategoryKeywords { .. } => "per_category",
            Self::SingleCategory { .. } => "single_category",
            Self::AllCategories { .. } => "all_categories",
            Self::LegacyAllCategories { .. } => "legacy_all_categories",
        }
    }
}

/// All feature configurations of one file, keyed by feature name.
#[derive(Debug, Clone, Default)]
pub struct FeatureConfigSet {
    features: BTreeMap<String, FeatureScope>,
}

impl FeatureConfigSet {
    /// Resolve a parsed configuration value. The top level must be an object.
    pub fn from_value(value: &Value) -> PackResult<Self> {
        let obj: &Map<String, Value> = value.as_object().ok_or_else(|| PackError::InvalidFeatureConfig {
            detail: format!("top-level value must be an object, found {}", kind_of(value)),
        })?;
        let features: BTreeMap<String, FeatureScope> = obj
            .iter()
            .map(|(name, cfg)| (name.clone(), FeatureScope::resolve(name, cfg)))
            .collect();
        Ok(Self { features })
    }

    /// Load a JSON or YAML feature configuration file.
    pub fn load(path: &Path) -> PackResult<Self> {
        let value = load_config_value(path)?;
        let set = Self::from_value(&value)?;
        info!(path = %path.display(), features = set.len(), "feature configuration loaded");
        Ok(set)
    }

    pub fn get(&self, feature: &str) -> Option<&FeatureScope> {
        self.features.get(feature)
    }

    pub fn contains(&self, feature: &str) -> bool {
        self.features.contains_key(feature)
    }

    /// Feature names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.features.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureScope)> {
        self.features.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

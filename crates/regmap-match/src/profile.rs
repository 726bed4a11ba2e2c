//! # Business Profile
//!
//! Request input is loosely typed JSON. [`BusinessProfile::from_value`]
//! coerces it into a fixed shape:
//!
//! - `size_m2`: number or numeric string;
//! - `seats`: number or numeric string, falling back to `seating`;
//! - `attributes`: lowercased tokens (an array, or a single string);
//! - `uses_gas` / `serves_meat`: the explicit field when present, otherwise
//!   whether a synonym appears among the attributes.
//!
//! A numeric field that cannot be read as a finite number is treated as
//! unknown. Only a non-object profile, a non-list attribute value, or an
//! uninterpretable boolean is an error.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{MatchError, MatchResult};

/// Attribute tokens that imply gas use.
pub const GAS_SYNONYMS: &[&str] = &["uses_gas", "gas", "גז"];

/// Attribute tokens that imply meat service.
pub const MEAT_SYNONYMS: &[&str] = &["serves_meat", "meat", "בשר"];

/// Normalized business characteristics for one request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BusinessProfile {
    pub size_m2: Option<f64>,
    pub seats: Option<f64>,
    pub attributes: Vec<String>,
    pub uses_gas: bool,
    pub serves_meat: bool,
}

impl BusinessProfile {
    /// Normalize raw request input.
    pub fn from_value(answers: &Value) -> MatchResult<Self> {
        let obj = answers.as_object().ok_or_else(|| MatchError::InvalidProfile {
            detail: format!("expected an object, found {answers}"),
        })?;

        let size_m2 = to_number(obj.get("size_m2"));
        let seats = to_number(obj.get("seats")).or_else(|| to_number(obj.get("seating")));
        let attributes = attributes(obj)?;

        let uses_gas = match explicit_flag(obj, "uses_gas")? {
            Some(flag) => flag,
            None => has_any(&attributes, GAS_SYNONYMS),
        };
        let serves_meat = match explicit_flag(obj, "serves_meat")? {
            Some(flag) => flag,
            None => has_any(&attributes, MEAT_SYNONYMS),
        };

        Ok(Self {
            size_m2,
            seats,
            attributes,
            uses_gas,
            serves_meat,
        })
    }

    /// Floor area, with unknown as `0`.
    pub fn size(&self) -> f64 {
        self.size_m2.unwrap_or(0.0)
    }

    /// Seat count, with unknown as `0`.
    pub fn seat_count(&self) -> f64 {
        self.seats.unwrap_or(0.0)
    }

    /// Whether `token` (compared lowercased) is among the attributes.
    pub fn has_attribute(&self, token: &str) -> bool {
        let token = token.to_lowercase();
        self.attributes.iter().any(|a| *a == token)
    }
}

/// Convenience wrapper for [`BusinessProfile::from_value`].
pub fn normalize_user_input(answers: &Value) -> MatchResult<BusinessProfile> {
    BusinessProfile::from_value(answers)
}

fn to_number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Bool(b) => f64::from(u8::from(*b)),
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn attributes(obj: &Map<String, Value>) -> MatchResult<Vec<String>> {
    let token = |v: &Value| match v {
        Value::String(s) => s.trim().to_lowercase(),
        other => other.to_string().to_lowercase(),
    };
    match obj.get("attributes") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items
            .iter()
            .map(token)
            .filter(|t| !t.is_empty())
            .collect()),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(Vec::new()),
        Some(single @ Value::String(_)) => Ok(vec![token(single)]),
        Some(other) => Err(MatchError::InvalidField {
            field: "attributes",
            value: other.to_string(),
        }),
    }
}

fn explicit_flag(obj: &Map<String, Value>, field: &'static str) -> MatchResult<Option<bool>> {
    let invalid = |v: &Value| MatchError::InvalidField {
        field,
        value: v.to_string(),
    };
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(Value::Number(n)) => Ok(Some(n.as_f64().is_some_and(|f| f != 0.0))),
        Some(v @ Value::String(s)) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "y" | "1" | "כן" => Ok(Some(true)),
            "false" | "no" | "n" | "0" | "" | "לא" => Ok(Some(false)),
            _ => Err(invalid(v)),
        },
        Some(other) => Err(invalid(other)),
    }
}

fn has_any(attributes: &[String], synonyms: &[&str]) -> bool {
    attributes.iter().any(|a| synonyms.contains(&a.as_str()))
}

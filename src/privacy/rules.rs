//! Generalization rules
//!
//! A generalization rule maps a precise value to a coarser bucket label. Rules
//! are keyed by field name and looked up at call time; a field without a rule is
//! never generalized implicitly.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Reasons a single value could not be generalized
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeneralizationError {
    /// Numeric range rule applied to a non-numeric value
    #[error("value is not numeric")]
    NotNumeric,

    /// Numeric value cannot be bucketed (non-finite or out of range)
    #[error("value is out of range for bucketing")]
    OutOfRange,

    /// Text rule applied to a non-string value
    #[error("value is not text")]
    NotText,
}

/// Deterministic bucketing function for one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GeneralizationRule {
    /// Buckets numbers into `[lo, lo + width - 1]` ranges labelled `"lo-hi"`
    NumericRange { width: i64 },
    /// Keeps the text before the first occurrence of `delimiter`
    Prefix { delimiter: String },
}

impl GeneralizationRule {
    /// Applies the rule to a value, producing the bucket label
    pub fn apply(&self, value: &Value) -> Result<Value, GeneralizationError> {
        match self {
            Self::NumericRange { width } => {
                let lower = bucket_lower_bound(value, *width)?;
                let upper = lower
                    .checked_add(*width - 1)
                    .ok_or(GeneralizationError::OutOfRange)?;
                Ok(Value::String(format!("{lower}-{upper}")))
            }
            Self::Prefix { delimiter } => {
                let text = value.as_str().ok_or(GeneralizationError::NotText)?;
                let head = text.split(delimiter.as_str()).next().unwrap_or(text);
                Ok(Value::String(head.to_string()))
            }
        }
    }

    fn validate(&self) -> Result<(), String> {
        match self {
            Self::NumericRange { width } if *width <= 0 => {
                Err(format!("numeric_range width must be > 0, got {width}"))
            }
            Self::Prefix { delimiter } if delimiter.is_empty() => {
                Err("prefix delimiter must not be empty".to_string())
            }
            _ => Ok(()),
        }
    }
}

/// Floor-divides a number into its bucket's lower bound
fn bucket_lower_bound(value: &Value, width: i64) -> Result<i64, GeneralizationError> {
    let number = match value {
        Value::Number(n) => n,
        _ => return Err(GeneralizationError::NotNumeric),
    };
    if width <= 0 {
        return Err(GeneralizationError::OutOfRange);
    }

    if let Some(i) = number.as_i64() {
        return i
            .div_euclid(width)
            .checked_mul(width)
            .ok_or(GeneralizationError::OutOfRange);
    }

    let f = number.as_f64().ok_or(GeneralizationError::OutOfRange)?;
    let lower = (f / width as f64).floor() * width as f64;
    if !lower.is_finite() || lower < i64::MIN as f64 || lower >= i64::MAX as f64 {
        return Err(GeneralizationError::OutOfRange);
    }
    Ok(lower as i64)
}

/// Field-name-to-rule table
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeneralizationRules {
    rules: BTreeMap<String, GeneralizationRule>,
}

impl GeneralizationRules {
    /// Empty table: no field is generalized
    pub fn empty() -> Self {
        Self::default()
    }

    /// Built-in rules for common analytics attributes
    ///
    /// - `age`: 10-year ranges (`42` → `"40-49"`)
    /// - `income`: 10 000-wide ranges (`52000` → `"50000-59999"`)
    /// - `location`: text before the first comma (`"Oslo, Norway"` → `"Oslo"`)
    pub fn defaults() -> Self {
        Self::empty()
            .with_rule("age", GeneralizationRule::NumericRange { width: 10 })
            .with_rule("income", GeneralizationRule::NumericRange { width: 10_000 })
            .with_rule(
                "location",
                GeneralizationRule::Prefix {
                    delimiter: ",".to_string(),
                },
            )
    }

    /// Adds or replaces the rule for a field
    pub fn with_rule(mut self, field: impl Into<String>, rule: GeneralizationRule) -> Self {
        self.rules.insert(field.into(), rule);
        self
    }

    /// Rule registered for a field, if any
    pub fn get(&self, field: &str) -> Option<&GeneralizationRule> {
        self.rules.get(field)
    }

    /// Number of registered rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rule is registered
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Field names with a registered rule
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    /// Validates every rule
    pub fn validate(&self) -> Result<(), String> {
        for (field, rule) in &self.rules {
            rule.validate()
                .map_err(|e| format!("generalization rule for '{field}': {e}"))?;
        }
        Ok(())
    }
}

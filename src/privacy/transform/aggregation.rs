//! Aggregation strategy
//!
//! Replaces the record with per-field summaries so per-record identity is
//! gone. Each requested field `f` becomes `f_summary`:
//!
//! - numbers: `{"type": "numeric", "count": 1, "sum": v, "avg": v}`
//! - everything else: `{"type": "categorical", "categories": {"<v>": 1}}`
//!
//! Fields that were not requested are dropped. Combining summaries across
//! records is left to the caller.

use super::{FieldReport, Transform, TransformContext};
use crate::domain::errors::PrivacyError;
use crate::domain::record::{field_text, is_numeric, Record};
use crate::privacy::level::PrivacyLevel;
use serde_json::{json, Value};

/// Suffix appended to summarized field names
pub const SUMMARY_SUFFIX: &str = "_summary";

/// Single-record statistical summary
#[derive(Debug, Default)]
pub struct Aggregation;

impl Aggregation {
    pub fn new() -> Self {
        Self
    }
}

fn summarize(value: &Value) -> Value {
    if is_numeric(value) {
        json!({
            "type": "numeric",
            "count": 1,
            "sum": value,
            "avg": value,
        })
    } else {
        let mut categories = serde_json::Map::new();
        categories.insert(field_text(value), json!(1));
        json!({
            "type": "categorical",
            "categories": categories,
        })
    }
}

impl Transform for Aggregation {
    fn level(&self) -> PrivacyLevel {
        PrivacyLevel::Aggregated
    }

    fn apply(
        &self,
        record: &mut Record,
        fields: &[String],
        _ctx: &mut TransformContext<'_>,
    ) -> Result<FieldReport, PrivacyError> {
        let mut report = FieldReport::default();
        let mut aggregated = Record::new();

        for field in fields {
            if let Some(value) = record.get(field) {
                aggregated.insert(format!("{field}{SUMMARY_SUFFIX}"), summarize(value));
                report.processed(field);
            }
        }

        *record = aggregated;
        Ok(report)
    }
}

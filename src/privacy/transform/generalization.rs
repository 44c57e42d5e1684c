//! Generalization strategy
//!
//! Applies the registered [`GeneralizationRule`](crate::privacy::rules::GeneralizationRule)
//! for each requested field. A value the rule cannot bucket is replaced by
//! [`GENERALIZATION_ERROR`] and reported as a warning; the remaining fields are
//! still processed. Fields without a rule are left untouched.

use super::{FieldReport, Transform, TransformContext};
use crate::domain::errors::PrivacyError;
use crate::domain::record::Record;
use crate::privacy::level::PrivacyLevel;
use serde_json::Value;

/// Sentinel stored when a value cannot be generalized
pub const GENERALIZATION_ERROR: &str = "GENERALIZATION_ERROR";

/// Rule-driven bucketing
#[derive(Debug, Default)]
pub struct Generalization;

impl Generalization {
    pub fn new() -> Self {
        Self
    }
}

impl Transform for Generalization {
    fn level(&self) -> PrivacyLevel {
        PrivacyLevel::Generalized
    }

    fn apply(
        &self,
        record: &mut Record,
        fields: &[String],
        ctx: &mut TransformContext<'_>,
    ) -> Result<FieldReport, PrivacyError> {
        let mut report = FieldReport::default();

        for field in fields {
            let Some(rule) = ctx.rules.get(field) else {
                tracing::debug!(field = %field, "No generalization rule registered, leaving field as-is");
                continue;
            };
            let Some(value) = record.get_mut(field) else {
                continue;
            };

            match rule.apply(value) {
                Ok(bucket) => *value = bucket,
                Err(e) => {
                    tracing::warn!(field = %field, error = %e, "Failed to generalize field");
                    *value = Value::String(GENERALIZATION_ERROR.to_string());
                    report.warn(field, e);
                }
            }
            report.processed(field);
        }

        Ok(report)
    }
}

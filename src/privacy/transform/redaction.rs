//! Redaction strategy

use super::{FieldReport, Transform, TransformContext};
use crate::domain::errors::PrivacyError;
use crate::domain::record::Record;
use crate::privacy::level::PrivacyLevel;
use serde_json::Value;

/// Marker replacing redacted values
pub const REDACTED_MARKER: &str = "[REDACTED]";

/// Redaction strategy - replaces values with [`REDACTED_MARKER`]
///
/// Irreversible and idempotent. Null values are redacted too: presence of the
/// field is all that matters.
#[derive(Debug, Default)]
pub struct Redaction;

impl Redaction {
    pub fn new() -> Self {
        Self
    }
}

impl Transform for Redaction {
    fn level(&self) -> PrivacyLevel {
        PrivacyLevel::Redacted
    }

    fn apply(
        &self,
        record: &mut Record,
        fields: &[String],
        _ctx: &mut TransformContext<'_>,
    ) -> Result<FieldReport, PrivacyError> {
        let mut report = FieldReport::default();

        for field in fields {
            if let Some(value) = record.get_mut(field) {
                *value = Value::String(REDACTED_MARKER.to_string());
                report.processed(field);
            }
        }

        Ok(report)
    }
}

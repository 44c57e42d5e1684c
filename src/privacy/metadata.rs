//! Processing metadata stamped onto every output record

use crate::domain::errors::PrivacyError;
use crate::domain::record::Record;
use crate::privacy::level::PrivacyLevel;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Name of the metadata block appended to processed records
pub const METADATA_FIELD: &str = "_privacy";

/// Audit block describing how a record was processed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrivacyMetadata {
    /// Level applied
    pub level: PrivacyLevel,
    /// UTC processing time (ISO-8601)
    #[serde(serialize_with = "serialize_timestamp")]
    pub processed_at: DateTime<Utc>,
    /// Requested fields that were present and transformed, in request order
    pub fields_processed: Vec<String>,
    /// Field-level failures recovered during processing
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

fn serialize_timestamp<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Micros, true))
}

impl PrivacyMetadata {
    /// Creates metadata stamped with the current time
    pub fn new(level: PrivacyLevel, fields_processed: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            level,
            processed_at: Utc::now(),
            fields_processed,
            warnings,
        }
    }

    /// Whether any field-level failure was recovered
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Fails if the record already carries a metadata block
pub fn ensure_no_collision(record: &Record) -> Result<(), PrivacyError> {
    if record.contains_key(METADATA_FIELD) {
        return Err(PrivacyError::MetadataCollision(METADATA_FIELD.to_string()));
    }
    Ok(())
}

/// Appends the metadata block to a record
///
/// Never overwrites: a record that already has the block is rejected.
pub fn stamp(record: &mut Record, metadata: &PrivacyMetadata) -> Result<(), PrivacyError> {
    ensure_no_collision(record)?;
    let block = serde_json::to_value(metadata)
        .map_err(|e| PrivacyError::processing("failed to serialize privacy metadata", e))?;
    record.insert(METADATA_FIELD.to_string(), block);
    Ok(())
}

/// Reads the metadata block back from a processed record
pub fn read(record: &Record) -> Option<PrivacyMetadata> {
    record
        .get(METADATA_FIELD)
        .cloned()
        .and_then(|block: Value| serde_json::from_value(block).ok())
}

//! Tokenization strategy
//!
//! Replaces values with deterministic keyed tokens: `TOK_` followed by the
//! hex HMAC-SHA256 of the value's text. The same value under the same key
//! always yields the same token, so tokenized columns still support equality
//! joins.
//!
//! `null` fields are not tokenized and do not appear in `fields_processed`;
//! `0`, `false` and `""` are.

use super::{FieldReport, Transform, TransformContext};
use crate::domain::errors::PrivacyError;
use crate::domain::record::{field_text, Record};
use crate::privacy::key::SecretKey;
use crate::privacy::level::PrivacyLevel;
use serde_json::Value;

/// Prefix marking tokenized values
pub const TOKEN_PREFIX: &str = "TOK_";

/// Length of a token: prefix plus 64 hex characters
pub const TOKEN_LEN: usize = TOKEN_PREFIX.len() + 64;

/// Deterministic keyed token substitution
#[derive(Debug, Default)]
pub struct Tokenization;

impl Tokenization {
    pub fn new() -> Self {
        Self
    }
}

/// Computes the token for a value
pub fn tokenize_value(key: &SecretKey, value: &Value) -> Result<String, PrivacyError> {
    let text = field_text(value);
    let digest = key.keyed_digest_hex(&[text.as_bytes()])?;
    Ok(format!("{TOKEN_PREFIX}{digest}"))
}

impl Transform for Tokenization {
    fn level(&self) -> PrivacyLevel {
        PrivacyLevel::Tokenized
    }

    fn apply(
        &self,
        record: &mut Record,
        fields: &[String],
        ctx: &mut TransformContext<'_>,
    ) -> Result<FieldReport, PrivacyError> {
        let key = ctx.require_key("tokenization")?;
        let mut report = FieldReport::default();

        for field in fields {
            let Some(value) = record.get_mut(field) else {
                continue;
            };
            if value.is_null() {
                continue;
            }
            *value = Value::String(tokenize_value(key, value)?);
            report.processed(field);
        }

        Ok(report)
    }
}

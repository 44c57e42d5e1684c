//! Transform strategies
//!
//! Each privacy level is implemented by one [`Transform`]. Transforms are
//! constructed once, are immutable afterwards, and operate on the engine's
//! private copy of the caller's record.

pub mod aggregation;
pub mod differential;
pub mod encryption;
pub mod generalization;
pub mod pseudonymization;
pub mod redaction;
pub mod synthesis;
pub mod tokenization;

use crate::domain::errors::PrivacyError;
use crate::domain::record::Record;
use crate::privacy::key::SecretKey;
use crate::privacy::level::PrivacyLevel;
use crate::privacy::rules::GeneralizationRules;
use rand::RngCore;

pub use aggregation::Aggregation;
pub use differential::DifferentialPrivacy;
pub use encryption::Encryption;
pub use generalization::Generalization;
pub use pseudonymization::Pseudonymization;
pub use redaction::Redaction;
pub use synthesis::Synthesis;
pub use tokenization::Tokenization;

/// Per-call inputs shared by all transforms
pub struct TransformContext<'a> {
    /// Secret for keyed transforms, if configured
    pub key: Option<&'a SecretKey>,
    /// Generalization rule table
    pub rules: &'a GeneralizationRules,
    /// Random source owned by this call
    pub rng: &'a mut dyn RngCore,
}

impl<'a> TransformContext<'a> {
    /// Returns the key or fails with [`PrivacyError::MissingKey`]
    pub fn require_key(&self, operation: &'static str) -> Result<&'a SecretKey, PrivacyError> {
        self.key.ok_or(PrivacyError::MissingKey(operation))
    }
}

/// Outcome of applying a transform to a record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldReport {
    /// Fields that were present and transformed, in request order
    pub processed: Vec<String>,
    /// Field-level failures recovered locally
    pub warnings: Vec<String>,
}

impl FieldReport {
    pub(crate) fn processed(&mut self, field: &str) {
        self.processed.push(field.to_string());
    }

    pub(crate) fn warn(&mut self, field: &str, message: impl std::fmt::Display) {
        self.warnings.push(format!("{field}: {message}"));
    }
}

/// A privacy transform bound to one level
pub trait Transform: Send + Sync {
    /// Level this transform implements
    fn level(&self) -> PrivacyLevel;

    /// Transforms the requested fields of `record` in place
    ///
    /// `record` is always the engine's own copy. Requested fields that are
    /// absent from the record are skipped and left out of the report.
    fn apply(
        &self,
        record: &mut Record,
        fields: &[String],
        ctx: &mut TransformContext<'_>,
    ) -> Result<FieldReport, PrivacyError>;
}

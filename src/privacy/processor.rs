//! Privacy processor
//!
//! This module provides the [`PrivacyProcessor`] façade: it validates the
//! input record, dispatches to the transform registered for the requested
//! [`PrivacyLevel`], and stamps the `_privacy` metadata block on the result.
//!
//! # Examples
//!
//! ```
//! use veil::privacy::{PrivacyLevel, PrivacyProcessor, SecretKey};
//! use serde_json::json;
//!
//! # fn example() -> Result<(), veil::domain::PrivacyError> {
//! let key = SecretKey::from_bytes(b"0123456789abcdef0123456789abcdef".to_vec())?;
//! let processor = PrivacyProcessor::builder().key(key).build()?;
//!
//! let result = processor.process(
//!     &json!({"email": "a@b.com", "age": 42}),
//!     PrivacyLevel::Tokenized,
//!     &["email", "age"],
//! )?;
//!
//! assert!(result.record["email"].as_str().unwrap().starts_with("TOK_"));
//! assert_eq!(result.metadata.fields_processed, ["email", "age"]);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use crate::config::schema::{AuditConfig, PrivacyConfig};
use crate::domain::errors::PrivacyError;
use crate::domain::record::Record;
use crate::domain::result::Result as VeilResult;
use crate::privacy::audit::AuditLogger;
use crate::privacy::key::SecretKey;
use crate::privacy::level::PrivacyLevel;
use crate::privacy::metadata::{self, PrivacyMetadata};
use crate::privacy::rules::GeneralizationRules;
use crate::privacy::transform::differential::{DEFAULT_EPSILON, DEFAULT_SENSITIVITY};
use crate::privacy::transform::synthesis::DEFAULT_SIGMA;
use crate::privacy::transform::{
    encryption, Aggregation, DifferentialPrivacy, Encryption, Generalization, Pseudonymization,
    Redaction, Synthesis, Tokenization, Transform, TransformContext,
};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

/// Transformed record with its metadata
///
/// `record` already contains the `_privacy` block; `metadata` is the same
/// block in typed form.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingResult {
    /// Output record, metadata block included
    pub record: Record,
    /// Typed copy of the metadata block
    #[serde(skip)]
    pub metadata: PrivacyMetadata,
}

impl ProcessingResult {
    /// Consumes the result, returning the output record as a JSON value
    pub fn into_value(self) -> Value {
        Value::Object(self.record)
    }

    /// Whether any field-level failure was recovered
    pub fn has_warnings(&self) -> bool {
        self.metadata.has_warnings()
    }
}

/// Record that failed inside a batch
#[derive(Debug)]
pub struct BatchFailure {
    /// Position of the record in the input batch
    pub index: usize,
    /// Why the record was rejected
    pub error: PrivacyError,
}

/// Outcome of [`PrivacyProcessor::process_batch`]
///
/// Failed records are reported, never passed through untransformed.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Successful results in input order
    pub results: Vec<ProcessingResult>,
    /// Records that failed, by input position
    pub failures: Vec<BatchFailure>,
}

impl BatchOutcome {
    /// Number of records submitted
    pub fn total(&self) -> usize {
        self.results.len() + self.failures.len()
    }

    /// Whether every record succeeded
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Builds the level-to-transform table, failing if any level is missing
///
/// Each level must be registered exactly once.
pub(crate) fn register_transforms(
    transforms: Vec<Box<dyn Transform>>,
) -> Result<HashMap<PrivacyLevel, Box<dyn Transform>>, PrivacyError> {
    let mut table: HashMap<PrivacyLevel, Box<dyn Transform>> = HashMap::new();

    for transform in transforms {
        let level = transform.level();
        if table.insert(level, transform).is_some() {
            return Err(PrivacyError::processing_msg(format!(
                "transform for privacy level '{level}' registered twice"
            )));
        }
    }

    if let Some(missing) = PrivacyLevel::ALL
        .into_iter()
        .find(|level| !table.contains_key(level))
    {
        return Err(PrivacyError::UnregisteredLevel(missing));
    }

    Ok(table)
}

/// Privacy processing façade
///
/// Immutable after construction and safe to share across threads and tasks
/// behind an [`Arc`]. Every call draws noise from its own generator.
pub struct PrivacyProcessor {
    key: Option<SecretKey>,
    rules: GeneralizationRules,
    transforms: HashMap<PrivacyLevel, Box<dyn Transform>>,
    audit_logger: Option<AuditLogger>,
}

impl std::fmt::Debug for PrivacyProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivacyProcessor")
            .field("has_key", &self.key.is_some())
            .field("rules", &self.rules)
            .field("levels", &self.transforms.len())
            .field("audit", &self.audit_logger.is_some())
            .finish()
    }
}

impl PrivacyProcessor {
    /// Starts building a processor
    pub fn builder() -> PrivacyProcessorBuilder {
        PrivacyProcessorBuilder::default()
    }

    /// Creates a processor from configuration
    ///
    /// The secret comes from `privacy.key` or, when unset, from the
    /// `PRIVACY_KEY` environment variable. A processor without a key still
    /// serves the unkeyed levels.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is malformed, a noise parameter is invalid,
    /// or the audit log cannot be prepared.
    pub fn from_config(privacy: &PrivacyConfig, audit: &AuditConfig) -> VeilResult<Self> {
        let key = match &privacy.key {
            Some(secret) => Some(SecretKey::from_base64(secret.expose_secret().as_ref())?),
            None => SecretKey::from_env()?,
        };
        if key.is_none() {
            tracing::warn!("No privacy key configured; raw, tokenized and pseudo levels will fail");
        }

        let mut builder = Self::builder()
            .rules(privacy.generalization.clone())
            .epsilon(privacy.epsilon)
            .sensitivity(privacy.sensitivity)
            .synthetic_sigma(privacy.synthetic_sigma);

        if let Some(key) = key {
            builder = builder.key(key);
        }
        if audit.enabled {
            let logger = AuditLogger::new(audit.log_path.clone(), audit.json_format)?;
            tracing::info!(path = %logger.log_path().display(), "Audit logging enabled");
            builder = builder.audit_logger(logger);
        }

        Ok(builder.build()?)
    }

    /// Processes a record under a privacy level
    ///
    /// The caller's record is never modified. Requested fields that are absent
    /// from the record are skipped; duplicates are processed once.
    ///
    /// # Errors
    ///
    /// - [`PrivacyError::InvalidInput`] if `record` is not a non-empty object
    /// - [`PrivacyError::MetadataCollision`] if it already has a `_privacy` field
    /// - [`PrivacyError::MissingKey`] for keyed levels without a secret
    /// - [`PrivacyError::Processing`] for anything else; no output is produced
    pub fn process<S: AsRef<str>>(
        &self,
        record: &Value,
        level: PrivacyLevel,
        fields: &[S],
    ) -> Result<ProcessingResult, PrivacyError> {
        let mut rng = StdRng::from_entropy();
        self.process_with_rng(record, level, fields, &mut rng)
    }

    /// Processes a record drawing randomness from `rng`
    ///
    /// The generator must not be shared between concurrent calls.
    pub fn process_with_rng<S: AsRef<str>>(
        &self,
        record: &Value,
        level: PrivacyLevel,
        fields: &[S],
        rng: &mut dyn RngCore,
    ) -> Result<ProcessingResult, PrivacyError> {
        let start = Instant::now();

        let source = record.as_object().ok_or_else(|| {
            PrivacyError::InvalidInput(format!(
                "record must be a JSON object, got {}",
                value_kind(record)
            ))
        })?;
        if source.is_empty() {
            return Err(PrivacyError::InvalidInput(
                "record must not be empty".to_string(),
            ));
        }
        metadata::ensure_no_collision(source)?;

        let transform = self
            .transforms
            .get(&level)
            .ok_or(PrivacyError::UnregisteredLevel(level))?;

        let fields = requested_fields(fields);
        tracing::debug!(
            level = %level,
            requested = fields.len(),
            randomized = level.is_randomized(),
            "Processing record"
        );

        // Deep copy: nested objects are never shared with the caller
        let mut working = source.clone();
        let mut ctx = TransformContext {
            key: self.key.as_ref(),
            rules: &self.rules,
            rng,
        };

        let report = transform.apply(&mut working, &fields, &mut ctx).map_err(|e| {
            tracing::error!(level = %level, error = %e, "Privacy transform failed");
            e
        })?;

        for warning in &report.warnings {
            tracing::warn!(level = %level, warning = %warning, "Field-level failure recovered");
        }

        let metadata = PrivacyMetadata::new(level, report.processed, report.warnings);
        metadata::stamp(&mut working, &metadata)?;

        let result = ProcessingResult {
            record: working,
            metadata,
        };

        if let Some(ref logger) = self.audit_logger {
            logger
                .log_processing(&result)
                .map_err(|e| PrivacyError::processing("failed to write audit entry", e))?;
        }

        tracing::info!(
            level = %level,
            fields_processed = result.metadata.fields_processed.len(),
            warnings = result.metadata.warnings.len(),
            duration_us = start.elapsed().as_micros() as u64,
            "Processed record"
        );

        Ok(result)
    }

    /// Processes a batch of records concurrently
    ///
    /// Each record runs on tokio's blocking pool with its own generator.
    /// Failed records are logged and reported in [`BatchOutcome::failures`].
    pub async fn process_batch(
        self: &Arc<Self>,
        records: Vec<Value>,
        level: PrivacyLevel,
        fields: &[String],
    ) -> BatchOutcome {
        let fields: Arc<[String]> = fields.into();

        let tasks = records.into_iter().enumerate().map(|(index, record)| {
            let processor = Arc::clone(self);
            let fields = Arc::clone(&fields);
            let handle = tokio::task::spawn_blocking(move || {
                processor.process(&record, level, &fields[..])
            });
            async move { (index, handle.await) }
        });

        let mut outcome = BatchOutcome::default();
        for (index, joined) in futures::future::join_all(tasks).await {
            let result = joined
                .map_err(|e| PrivacyError::processing("batch worker failed", e))
                .and_then(|r| r);
            match result {
                Ok(result) => outcome.results.push(result),
                Err(error) => {
                    tracing::error!(index, error = %error, "Failed to process record in batch");
                    outcome.failures.push(BatchFailure { index, error });
                }
            }
        }

        crate::log_batch_complete!(level, outcome.total(), outcome.failures.len());

        outcome
    }

    /// Decrypts one value produced under [`PrivacyLevel::Raw`]
    ///
    /// The plaintext is always returned as a string.
    pub fn decrypt_field(&self, envelope: &str) -> Result<String, PrivacyError> {
        let key = self.key.as_ref().ok_or(PrivacyError::MissingKey("decryption"))?;
        encryption::decrypt_text(key, envelope)
    }

    /// Decrypts the named fields of a record produced under [`PrivacyLevel::Raw`]
    ///
    /// Returns a new record; absent and null fields are skipped. Any field that
    /// is not a valid envelope fails the whole call with
    /// [`PrivacyError::Integrity`].
    pub fn decrypt_record<S: AsRef<str>>(
        &self,
        record: &Value,
        fields: &[S],
    ) -> Result<Record, PrivacyError> {
        let key = self.key.as_ref().ok_or(PrivacyError::MissingKey("decryption"))?;
        let source = record.as_object().ok_or_else(|| {
            PrivacyError::InvalidInput(format!(
                "record must be a JSON object, got {}",
                value_kind(record)
            ))
        })?;

        let mut decrypted = source.clone();
        for field in requested_fields(fields) {
            let Some(value) = decrypted.get_mut(&field) else {
                continue;
            };
            let plaintext = match value {
                Value::Null => continue,
                Value::String(envelope) => encryption::decrypt_text(key, envelope)
                    .map_err(|e| match e {
                        PrivacyError::Integrity(reason) => {
                            PrivacyError::Integrity(format!("field '{field}': {reason}"))
                        }
                        other => other,
                    })?,
                _ => {
                    return Err(PrivacyError::Integrity(format!(
                        "field '{field}' is not an encrypted value"
                    )))
                }
            };
            *value = Value::String(plaintext);
        }

        Ok(decrypted)
    }

    /// Whether a secret key is configured
    pub fn has_key(&self) -> bool {
        self.key.is_some()
    }

    /// Generalization rules in use
    pub fn rules(&self) -> &GeneralizationRules {
        &self.rules
    }

    /// Levels with a registered transform
    pub fn levels(&self) -> Vec<PrivacyLevel> {
        let mut levels: Vec<_> = self.transforms.keys().copied().collect();
        levels.sort();
        levels
    }
}

/// Requested field names, deduplicated in first-seen order
fn requested_fields<S: AsRef<str>>(fields: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    fields
        .iter()
        .map(AsRef::as_ref)
        .filter(|field| seen.insert(*field))
        .map(str::to_string)
        .collect()
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Builder for [`PrivacyProcessor`]
pub struct PrivacyProcessorBuilder {
    key: Option<SecretKey>,
    rules: GeneralizationRules,
    epsilon: f64,
    sensitivity: f64,
    synthetic_sigma: f64,
    audit_logger: Option<AuditLogger>,
}

impl Default for PrivacyProcessorBuilder {
    fn default() -> Self {
        Self {
            key: None,
            rules: GeneralizationRules::defaults(),
            epsilon: DEFAULT_EPSILON,
            sensitivity: DEFAULT_SENSITIVITY,
            synthetic_sigma: DEFAULT_SIGMA,
            audit_logger: None,
        }
    }
}

impl PrivacyProcessorBuilder {
    /// Sets the secret used by keyed levels
    pub fn key(mut self, key: SecretKey) -> Self {
        self.key = Some(key);
        self
    }

    /// Replaces the generalization rules (defaults to [`GeneralizationRules::defaults`])
    pub fn rules(mut self, rules: GeneralizationRules) -> Self {
        self.rules = rules;
        self
    }

    /// Sets the differential privacy epsilon
    pub fn epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Sets the differential privacy sensitivity
    pub fn sensitivity(mut self, sensitivity: f64) -> Self {
        self.sensitivity = sensitivity;
        self
    }

    /// Sets the standard deviation of synthetic multiplicative noise
    pub fn synthetic_sigma(mut self, sigma: f64) -> Self {
        self.synthetic_sigma = sigma;
        self
    }

    /// Records every processed record in an audit trail
    pub fn audit_logger(mut self, logger: AuditLogger) -> Self {
        self.audit_logger = Some(logger);
        self
    }

    /// Builds the processor and checks that every level has a transform
    pub fn build(self) -> Result<PrivacyProcessor, PrivacyError> {
        self.rules
            .validate()
            .map_err(PrivacyError::InvalidInput)?;

        let differential = DifferentialPrivacy::new(self.epsilon, self.sensitivity)?;
        let synthesis = Synthesis::new(self.synthetic_sigma)?;
        tracing::debug!(
            epsilon = differential.epsilon(),
            sensitivity = differential.sensitivity(),
            synthetic_sigma = synthesis.sigma(),
            rule_fields = ?self.rules.fields().collect::<Vec<_>>(),
            "Building privacy processor"
        );

        let transforms: Vec<Box<dyn Transform>> = vec![
            Box::new(Encryption::new()),
            Box::new(Tokenization::new()),
            Box::new(Pseudonymization::new()),
            Box::new(Redaction::new()),
            Box::new(Generalization::new()),
            Box::new(differential),
            Box::new(Aggregation::new()),
            Box::new(synthesis),
        ];

        Ok(PrivacyProcessor {
            key: self.key,
            rules: self.rules,
            transforms: register_transforms(transforms)?,
            audit_logger: self.audit_logger,
        })
    }
}

//! Privacy processing engine
//!
//! This module transforms JSON records so that named sensitive fields satisfy
//! one of eight [`PrivacyLevel`]s, and stamps each output with a `_privacy`
//! metadata block describing what was done.
//!
//! # Architecture
//!
//! - [`processor`] - [`PrivacyProcessor`] façade, batch processing and decryption
//! - [`transform`] - One [`transform::Transform`] per level
//! - [`key`] - Secret key material shared by the keyed levels
//! - [`rules`] - Per-field generalization rules
//! - [`metadata`] - The `_privacy` block
//! - [`audit`] - Append-only audit trail

pub mod audit;
pub mod key;
pub mod level;
pub mod metadata;
pub mod processor;
pub mod rules;
pub mod transform;

pub use audit::AuditLogger;
pub use key::SecretKey;
pub use level::PrivacyLevel;
pub use metadata::{PrivacyMetadata, METADATA_FIELD};
pub use processor::{
    BatchFailure, BatchOutcome, PrivacyProcessor, PrivacyProcessorBuilder, ProcessingResult,
};
pub use rules::{GeneralizationError, GeneralizationRule, GeneralizationRules};

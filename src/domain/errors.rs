//! Domain error types
//!
//! This module defines the error hierarchy for Veil. The privacy engine reports
//! failures through [`PrivacyError`]; the application layer (configuration, CLI,
//! audit files) wraps those in [`VeilError`]. Neither exposes third-party error
//! types in its variants.

use crate::privacy::level::PrivacyLevel;
use thiserror::Error;

/// Boxed error cause carried by [`PrivacyError::Processing`]
pub type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Privacy engine errors
///
/// Field-level failures (a malformed value under the Generalized level, a
/// non-numeric value under the Differential level) are recovered inside the
/// engine and never surface here. Every variant below means the whole call
/// failed and no output was produced.
#[derive(Debug, Error)]
pub enum PrivacyError {
    /// Record is not a JSON object, or is empty
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A keyed operation was invoked without a configured secret
    #[error("Missing key: {0} requires a configured secret key")]
    MissingKey(&'static str),

    /// Ciphertext failed authentication, is malformed, or was produced under another key
    #[error("Integrity check failed: {0}")]
    Integrity(String),

    /// Record already carries a field named like the metadata block
    #[error("Metadata collision: record already contains field '{0}'")]
    MetadataCollision(String),

    /// No transform is registered for a privacy level
    #[error("No transform registered for privacy level '{0}'")]
    UnregisteredLevel(PrivacyLevel),

    /// Any other failure, wrapping the original cause
    #[error("Processing error: {message}")]
    Processing {
        message: String,
        #[source]
        source: Option<BoxedCause>,
    },
}

impl PrivacyError {
    /// Creates a processing error that wraps an underlying cause
    pub fn processing(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a processing error without an underlying cause
    pub fn processing_msg(message: impl Into<String>) -> Self {
        Self::Processing {
            message: message.into(),
            source: None,
        }
    }
}

/// Main Veil error type
///
/// This is the error type used by configuration loading, logging setup, the
/// audit trail and the CLI.
#[derive(Debug, Error)]
pub enum VeilError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Privacy engine errors
    #[error("Privacy error: {0}")]
    Privacy(#[from] PrivacyError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Audit trail errors
    #[error("Audit error: {0}")]
    Audit(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for VeilError {
    fn from(err: std::io::Error) -> Self {
        VeilError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for VeilError {
    fn from(err: serde_json::Error) -> Self {
        VeilError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for VeilError {
    fn from(err: toml::de::Error) -> Self {
        VeilError::Configuration(format!("TOML parse error: {err}"))
    }
}

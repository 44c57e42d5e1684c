//! Configuration schema types
//!
//! This module defines the structure of `veil.toml`.

use crate::config::SecretString;
use crate::privacy::level::PrivacyLevel;
use crate::privacy::rules::GeneralizationRules;
use crate::privacy::transform::differential::{DEFAULT_EPSILON, DEFAULT_SENSITIVITY};
use crate::privacy::transform::synthesis::DEFAULT_SIGMA;
use secrecy::ExposeSecret;
use serde::Deserialize;
use std::path::PathBuf;

/// Main Veil configuration
///
/// This is the root configuration structure that maps to the TOML file. Every
/// section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VeilConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Privacy engine settings
    #[serde(default)]
    pub privacy: PrivacyConfig,

    /// Audit trail settings
    #[serde(default)]
    pub audit: AuditConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl VeilConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.privacy.validate()?;
        self.audit.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Privacy engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PrivacyConfig {
    /// Base64-encoded secret for the keyed levels
    ///
    /// Falls back to the `PRIVACY_KEY` environment variable when unset.
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub key: Option<SecretString>,

    /// Level used when a command does not name one
    #[serde(default)]
    pub default_level: PrivacyLevel,

    /// Fields processed when a command does not name any
    #[serde(default)]
    pub sensitive_fields: Vec<String>,

    /// Differential privacy budget
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,

    /// Differential privacy query sensitivity
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f64,

    /// Standard deviation of synthetic multiplicative noise
    #[serde(default = "default_synthetic_sigma")]
    pub synthetic_sigma: f64,

    /// Per-field generalization rules
    #[serde(default = "GeneralizationRules::defaults")]
    pub generalization: GeneralizationRules,
}

impl PrivacyConfig {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref key) = self.key {
            if key.expose_secret().is_blank() {
                return Err("privacy.key must not be empty".to_string());
            }
        }

        if self.sensitive_fields.iter().any(|f| f.trim().is_empty()) {
            return Err("privacy.sensitive_fields must not contain empty names".to_string());
        }

        for (name, value) in [
            ("epsilon", self.epsilon),
            ("sensitivity", self.sensitivity),
            ("synthetic_sigma", self.synthetic_sigma),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(format!("privacy.{name} must be > 0, got {value}"));
            }
        }

        self.generalization
            .validate()
            .map_err(|e| format!("privacy.generalization: {e}"))?;

        Ok(())
    }
}

impl Default for PrivacyConfig {
    fn default() -> Self {
        Self {
            key: None,
            default_level: PrivacyLevel::default(),
            sensitive_fields: Vec::new(),
            epsilon: default_epsilon(),
            sensitivity: default_sensitivity(),
            synthetic_sigma: default_synthetic_sigma(),
            generalization: GeneralizationRules::defaults(),
        }
    }
}

/// Audit trail configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    /// Append one entry per processed record
    #[serde(default)]
    pub enabled: bool,

    /// Audit file path
    #[serde(default = "default_audit_path")]
    pub log_path: PathBuf,

    /// Write JSON lines instead of plain text
    #[serde(default = "default_true")]
    pub json_format: bool,
}

impl AuditConfig {
    fn validate(&self) -> Result<(), String> {
        if self.enabled && self.log_path.as_os_str().is_empty() {
            return Err("audit.log_path is required when audit is enabled".to_string());
        }
        Ok(())
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_path: default_audit_path(),
            json_format: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    /// Console-only logging
    pub fn console() -> Self {
        Self {
            local_enabled: false,
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path is required when local logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_epsilon() -> f64 {
    DEFAULT_EPSILON
}

fn default_sensitivity() -> f64 {
    DEFAULT_SENSITIVITY
}

fn default_synthetic_sigma() -> f64 {
    DEFAULT_SIGMA
}

fn default_audit_path() -> PathBuf {
    PathBuf::from("logs/veil-audit.log")
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

//! Configuration management for Veil.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! Veil uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `VEIL_*` environment overrides
//! - Default values for every setting
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use veil::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("veil.toml")?;
//!
//! println!("Default level: {}", config.privacy.default_level);
//! println!("Epsilon: {}", config.privacy.epsilon);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Application settings (log level)
//! - [`PrivacyConfig`] - Key, default level, noise parameters, generalization rules
//! - [`AuditConfig`] - Audit trail
//! - [`LoggingConfig`] - Local file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [privacy]
//! key = "${VEIL_KEY}"
//! default_level = "tokenized"
//! sensitive_fields = ["email", "ip_address"]
//! epsilon = 1.0
//!
//! [privacy.generalization.age]
//! kind = "numeric_range"
//! width = 10
//!
//! [audit]
//! enabled = true
//! log_path = "logs/veil-audit.log"
//! ```
//!
//! When `privacy.key` is unset the key is read from `PRIVACY_KEY`.

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::{load_config, parse_config};
pub use schema::{ApplicationConfig, AuditConfig, LoggingConfig, PrivacyConfig, VeilConfig};
pub use secret::{secret_string, SecretString, SecretValue};

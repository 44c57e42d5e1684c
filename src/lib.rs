// Veil - Privacy Processing for Analytics Records
// Copyright (c) 2025 Veil Contributors
// Licensed under the MIT License

//! # Veil - Privacy Processing for Analytics Records
//!
//! Veil transforms flat JSON analytics events so that named sensitive fields
//! satisfy a declared privacy level, and stamps every output with a `_privacy`
//! block recording what was done.
//!
//! ## Privacy Levels
//!
//! | Level | Tag | Effect on each requested field |
//! |-------|-----|--------------------------------|
//! | Raw | `raw` | AES-256-GCM encrypted, reversible by the key holder |
//! | Tokenized | `tokenized` | `TOK_` + keyed HMAC, deterministic and joinable |
//! | Pseudonymized | `pseudo` | `PSEUDO_<field>_` + truncated keyed HMAC |
//! | Redacted | `redacted` | `[REDACTED]` |
//! | Generalized | `generalized` | Bucketed by a per-field rule |
//! | Differential | `differential` | Laplace noise on numbers |
//! | Aggregated | `aggregated` | Record replaced by `<field>_summary` entries |
//! | Synthetic | `synthetic` | Jittered numbers, placeholder text |
//!
//! ## Architecture
//!
//! - [`privacy`] - The engine: levels, transforms, processor, audit trail
//! - [`domain`] - Record type and error types
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//! - [`cli`] - Command-line interface
//!
//! ## Quick Start
//!
//! ```rust
//! use veil::privacy::{PrivacyLevel, PrivacyProcessor, SecretKey};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let key = SecretKey::from_base64("MDEyMzQ1Njc4OWFiY2RlZjAxMjM0NTY3ODlhYmNkZWY=")?;
//! let processor = PrivacyProcessor::builder().key(key).build()?;
//!
//! let event = json!({"email": "a@b.com", "age": 42, "page": "/pricing"});
//! let result = processor.process(&event, PrivacyLevel::Generalized, &["age"])?;
//!
//! assert_eq!(result.record["age"], json!("40-49"));
//! assert_eq!(result.record["page"], json!("/pricing"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! The engine returns [`domain::PrivacyError`]; failures of individual field
//! values under the generalized and differential levels are recovered and
//! reported as metadata warnings instead.
//!
//! ## Logging
//!
//! Veil uses structured logging with the `tracing` crate. Events carry levels,
//! field names and counts, never field values.

pub mod cli;
pub mod config;
pub mod domain;
pub mod logging;
pub mod privacy;

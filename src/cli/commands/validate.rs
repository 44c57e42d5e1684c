//! Validate config command implementation
//!
//! This module implements the `validate-config` command: it loads the
//! configuration, builds a processor from it (which decodes the key and checks
//! the noise parameters) and prints a summary. The key itself is never shown.

use super::{EXIT_CONFIG, EXIT_OK};
use crate::config::load_config;
use crate::privacy::PrivacyProcessor;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let processor = match PrivacyProcessor::from_config(&config.privacy, &config.audit) {
            Ok(p) => p,
            Err(e) => {
                println!("❌ Privacy settings are not usable");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!(
            "  Key Configured: {}",
            if processor.has_key() { "yes" } else { "no" }
        );
        println!("  Default Level: {}", config.privacy.default_level);
        println!("  Sensitive Fields: {:?}", config.privacy.sensitive_fields);
        println!(
            "  Differential Privacy: epsilon={} sensitivity={}",
            config.privacy.epsilon, config.privacy.sensitivity
        );
        println!("  Synthetic Sigma: {}", config.privacy.synthetic_sigma);
        println!(
            "  Generalization Rules: {:?}",
            processor.rules().fields().collect::<Vec<_>>()
        );
        if config.audit.enabled {
            println!("  Audit Log: {}", config.audit.log_path.display());
        } else {
            println!("  Audit Log: disabled");
        }
        if !processor.has_key() {
            println!();
            println!("⚠️  No key: raw, tokenized and pseudo levels will fail");
        }
        println!();

        Ok(EXIT_OK)
    }
}

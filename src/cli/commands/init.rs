//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file. The file references the key through `${VEIL_KEY}`;
//! Veil never generates keys.

use super::{EXIT_CONFIG, EXIT_FATAL, EXIT_OK};
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "veil.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Veil configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(EXIT_CONFIG);
        }

        match fs::write(&self.output, Self::generate_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Put a base64 secret of at least 16 bytes in VEIL_KEY (or .env)");
                println!("  3. Validate configuration: veil validate-config");
                println!("  4. Process a record: veil process --input event.json --level tokenized");
                println!();
                Ok(EXIT_OK)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(EXIT_FATAL)
            }
        }
    }

    /// Generate the sample configuration
    fn generate_config() -> String {
        r#"# Veil Configuration File
# Privacy processing for analytics event records

[application]
# Log level: trace, debug, info, warn, error
log_level = "info"

# ============================================================================
# Privacy Engine
# ============================================================================
[privacy]
# Base64 secret (>= 16 bytes) for the raw, tokenized and pseudo levels.
# When omitted, PRIVACY_KEY is read from the environment.
key = "${VEIL_KEY}"

# Level used when --level is not given:
# raw | tokenized | pseudo | redacted | generalized | differential | aggregated | synthetic
default_level = "tokenized"

# Fields processed when --fields is not given
sensitive_fields = ["email", "ip_address", "user_id"]

# Differential privacy: Laplace scale = sensitivity / epsilon
epsilon = 1.0
sensitivity = 1.0

# Standard deviation of multiplicative noise for the synthetic level
synthetic_sigma = 0.1

# Generalization rules; a field without a rule is left unchanged
[privacy.generalization.age]
kind = "numeric_range"
width = 10

[privacy.generalization.income]
kind = "numeric_range"
width = 10000

[privacy.generalization.location]
kind = "prefix"
delimiter = ","

# ============================================================================
# Audit Trail
# ============================================================================
[audit]
# One entry per processed record: level, field names, output digest
enabled = false
log_path = "logs/veil-audit.log"
json_format = true

# ============================================================================
# Logging Configuration
# ============================================================================
[logging]
# JSON file logging in addition to the console
local_enabled = false
local_path = "logs"

# Log rotation: daily, hourly or never
local_rotation = "daily"
"#
        .to_string()
    }
}

//! CLI command implementations
//!
//! This module contains all CLI command implementations and the input/output
//! helpers they share.

pub mod decrypt;
pub mod init;
pub mod process;
pub mod validate;

use crate::config::{load_config, parse_config, VeilConfig};
use crate::domain::{Result, VeilError};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Exit code: success
pub const EXIT_OK: i32 = 0;
/// Exit code: some records in a batch failed
pub const EXIT_PARTIAL: i32 = 1;
/// Exit code: configuration or key error
pub const EXIT_CONFIG: i32 = 2;
/// Exit code: invalid input record
pub const EXIT_INPUT: i32 = 3;
/// Exit code: fatal error
pub const EXIT_FATAL: i32 = 5;

/// Loads the configuration file, falling back to defaults when it is absent
///
/// Environment overrides and validation apply in both cases.
pub fn load_config_or_default(config_path: &str) -> Result<VeilConfig> {
    if Path::new(config_path).exists() {
        load_config(config_path)
    } else {
        tracing::debug!(config_path = %config_path, "Configuration file not found, using defaults");
        parse_config("")
    }
}

/// Reads a JSON document from a file, or from stdin when no path is given
pub(crate) async fn read_json_input(input: Option<&PathBuf>) -> Result<Value> {
    let text = match input {
        Some(path) => tokio::fs::read_to_string(path).await.map_err(|e| {
            VeilError::Io(format!("Failed to read input {}: {}", path.display(), e))
        })?,
        None => {
            let mut buffer = String::new();
            tokio::io::stdin().read_to_string(&mut buffer).await?;
            buffer
        }
    };

    serde_json::from_str(&text)
        .map_err(|e| VeilError::Validation(format!("Input is not valid JSON: {e}")))
}

/// Writes a JSON document to a file, or to stdout when no path is given
pub(crate) async fn write_json_output(
    value: &Value,
    output: Option<&PathBuf>,
    pretty: bool,
) -> Result<()> {
    let mut text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    text.push('\n');

    match output {
        Some(path) => tokio::fs::write(path, text).await.map_err(|e| {
            VeilError::Io(format!("Failed to write output {}: {}", path.display(), e))
        }),
        None => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(text.as_bytes()).await?;
            stdout.flush().await?;
            Ok(())
        }
    }
}

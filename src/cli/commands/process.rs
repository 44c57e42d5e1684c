//! Process command implementation
//!
//! This module implements the `process` command: it reads a JSON record (or an
//! array of records), applies a privacy level to the requested fields and
//! writes the transformed output.

use super::{
    load_config_or_default, read_json_input, write_json_output, EXIT_CONFIG, EXIT_FATAL,
    EXIT_INPUT, EXIT_OK, EXIT_PARTIAL,
};
use crate::domain::PrivacyError;
use crate::privacy::{PrivacyLevel, PrivacyProcessor};
use clap::Args;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments for the process command
#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Input JSON file (object or array of objects); reads stdin when omitted
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output file; writes stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Privacy level (raw, tokenized, pseudo, redacted, generalized,
    /// differential, aggregated, synthetic); defaults to privacy.default_level
    #[arg(long)]
    pub level: Option<PrivacyLevel>,

    /// Fields to process (comma-separated); defaults to privacy.sensitive_fields
    #[arg(short, long, value_delimiter = ',')]
    pub fields: Vec<String>,

    /// Pretty-print the output
    #[arg(long)]
    pub pretty: bool,
}

impl ProcessArgs {
    /// Execute the process command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_config_or_default(config_path) {
            Ok(c) => c,
            Err(e) => {
                crate::log_error_with_context!(&e, "Failed to load configuration");
                eprintln!("❌ {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let processor = match PrivacyProcessor::from_config(&config.privacy, &config.audit) {
            Ok(p) => Arc::new(p),
            Err(e) => {
                crate::log_error_with_context!(&e, "Failed to create privacy processor");
                eprintln!("❌ {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let level = self.level.unwrap_or(config.privacy.default_level);
        let fields = if self.fields.is_empty() {
            config.privacy.sensitive_fields.clone()
        } else {
            self.fields.clone()
        };
        if fields.is_empty() {
            tracing::warn!("No fields requested; output will only gain a metadata block");
        }

        let input = match read_json_input(self.input.as_ref()).await {
            Ok(v) => v,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(EXIT_INPUT);
            }
        };

        tracing::info!(level = %level, fields = ?fields, "Starting process command");

        let (output, exit_code) = match input {
            Value::Array(records) => {
                let outcome = processor.process_batch(records, level, &fields).await;
                for failure in &outcome.failures {
                    eprintln!("❌ Record {}: {}", failure.index, failure.error);
                }
                let code = if outcome.is_complete() {
                    EXIT_OK
                } else {
                    EXIT_PARTIAL
                };
                let results = outcome
                    .results
                    .into_iter()
                    .map(|r| r.into_value())
                    .collect();
                (Value::Array(results), code)
            }
            record => match processor.process(&record, level, &fields) {
                Ok(result) => (result.into_value(), EXIT_OK),
                Err(e) => {
                    crate::log_error_with_context!(&e, "Failed to process record");
                    eprintln!("❌ {e}");
                    return Ok(exit_code_for(&e));
                }
            },
        };

        write_json_output(&output, self.output.as_ref(), self.pretty).await?;
        Ok(exit_code)
    }
}

/// Maps an engine error to the command's exit code
pub(crate) fn exit_code_for(error: &PrivacyError) -> i32 {
    match error {
        PrivacyError::InvalidInput(_)
        | PrivacyError::MetadataCollision(_)
        | PrivacyError::Integrity(_) => EXIT_INPUT,
        PrivacyError::MissingKey(_) | PrivacyError::UnregisteredLevel(_) => EXIT_CONFIG,
        PrivacyError::Processing { .. } => EXIT_FATAL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use tempfile::tempdir;

    #[test]
    fn test_parse_process_args() {
        let cli = Cli::parse_from([
            "veil",
            "process",
            "--level",
            "pseudo",
            "--fields",
            "email,ip",
            "--pretty",
        ]);
        let Commands::Process(args) = cli.command else {
            panic!("expected process command");
        };
        assert_eq!(args.level, Some(PrivacyLevel::Pseudonymized));
        assert_eq!(args.fields, ["email", "ip"]);
        assert!(args.pretty);
        assert!(args.input.is_none());
    }

    #[test]
    fn test_parse_rejects_unknown_level() {
        assert!(Cli::try_parse_from(["veil", "process", "--level", "secret"]).is_err());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            exit_code_for(&PrivacyError::InvalidInput("x".into())),
            EXIT_INPUT
        );
        assert_eq!(
            exit_code_for(&PrivacyError::MissingKey("tokenization")),
            EXIT_CONFIG
        );
        assert_eq!(
            exit_code_for(&PrivacyError::processing_msg("boom")),
            EXIT_FATAL
        );
    }

    #[tokio::test]
    async fn test_execute_redacts_file_input() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.json");
        let output = dir.path().join("out.json");
        std::fs::write(&input, r#"{"email": "a@b.com", "page": "/home"}"#).unwrap();

        let args = ProcessArgs {
            input: Some(input),
            output: Some(output.clone()),
            level: Some(PrivacyLevel::Redacted),
            fields: vec!["email".to_string()],
            pretty: false,
        };
        let missing_config = dir.path().join("veil.toml");
        let code = args
            .execute(missing_config.to_str().unwrap())
            .await
            .unwrap();

        assert_eq!(code, EXIT_OK);
        let written: Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written["email"], "[REDACTED]");
        assert_eq!(written["page"], "/home");
        assert_eq!(written["_privacy"]["level"], "redacted");
    }

    #[tokio::test]
    async fn test_execute_batch_reports_partial_failure() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.json");
        let output = dir.path().join("out.json");
        std::fs::write(&input, r#"[{"age": 42}, {}, {"age": 17}]"#).unwrap();

        let args = ProcessArgs {
            input: Some(input),
            output: Some(output.clone()),
            level: Some(PrivacyLevel::Generalized),
            fields: vec!["age".to_string()],
            pretty: true,
        };
        let missing_config = dir.path().join("veil.toml");
        let code = args
            .execute(missing_config.to_str().unwrap())
            .await
            .unwrap();

        assert_eq!(code, EXIT_PARTIAL);
        let written: Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        let records = written.as_array().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["age"], "40-49");
        assert_eq!(records[1]["age"], "10-19");
    }
}

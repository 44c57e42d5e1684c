//! Decrypt command implementation
//!
//! Reverses the `raw` level for key holders: the named fields of a record (or
//! of each record in an array) are decrypted back to their string form.

use super::process::exit_code_for;
use super::{
    load_config_or_default, read_json_input, write_json_output, EXIT_CONFIG, EXIT_INPUT, EXIT_OK,
};
use crate::privacy::PrivacyProcessor;
use clap::Args;
use serde_json::Value;
use std::path::PathBuf;

/// Arguments for the decrypt command
#[derive(Args, Debug)]
pub struct DecryptArgs {
    /// Input JSON file produced with `--level raw`; reads stdin when omitted
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output file; writes stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Fields to decrypt (comma-separated); defaults to the fields listed in
    /// each record's `_privacy` block
    #[arg(short, long, value_delimiter = ',')]
    pub fields: Vec<String>,

    /// Pretty-print the output
    #[arg(long)]
    pub pretty: bool,
}

impl DecryptArgs {
    /// Execute the decrypt command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_config_or_default(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let processor = match PrivacyProcessor::from_config(&config.privacy, &config.audit) {
            Ok(p) if p.has_key() => p,
            Ok(_) => {
                eprintln!("❌ Decryption requires privacy.key or PRIVACY_KEY");
                return Ok(EXIT_CONFIG);
            }
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let input = match read_json_input(self.input.as_ref()).await {
            Ok(v) => v,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(EXIT_INPUT);
            }
        };

        let output = match input {
            Value::Array(records) => {
                let mut decrypted = Vec::with_capacity(records.len());
                for (index, record) in records.iter().enumerate() {
                    match self.decrypt_one(&processor, record) {
                        Ok(v) => decrypted.push(v),
                        Err(e) => {
                            crate::log_error_with_context!(&e, "Failed to decrypt record");
                            eprintln!("❌ Record {index}: {e}");
                            return Ok(exit_code_for(&e));
                        }
                    }
                }
                Value::Array(decrypted)
            }
            record => match self.decrypt_one(&processor, &record) {
                Ok(v) => v,
                Err(e) => {
                    crate::log_error_with_context!(&e, "Failed to decrypt record");
                    eprintln!("❌ {e}");
                    return Ok(exit_code_for(&e));
                }
            },
        };

        write_json_output(&output, self.output.as_ref(), self.pretty).await?;
        tracing::info!("Decryption completed");
        Ok(EXIT_OK)
    }

    fn decrypt_one(
        &self,
        processor: &PrivacyProcessor,
        record: &Value,
    ) -> Result<Value, crate::domain::PrivacyError> {
        let fields = if self.fields.is_empty() {
            recorded_fields(record)
        } else {
            self.fields.clone()
        };
        processor
            .decrypt_record(record, &fields)
            .map(Value::Object)
    }
}

/// Field names listed in a record's metadata block, if any
fn recorded_fields(record: &Value) -> Vec<String> {
    record
        .as_object()
        .and_then(crate::privacy::metadata::read)
        .map(|m| m.fields_processed)
        .unwrap_or_default()
}

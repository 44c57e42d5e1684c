//! Audit logger for privacy processing

use crate::domain::errors::VeilError;
use crate::domain::result::Result;
use crate::privacy::processor::ProcessingResult;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use uuid::Uuid;

/// Audit log entry
#[derive(Debug, Serialize)]
struct AuditLogEntry {
    entry_id: Uuid,
    timestamp: String,
    level: String,
    fields_processed: Vec<String>,
    warnings_count: usize,
    /// SHA-256 of the stored output, for later tamper checks (never the values)
    output_digest: String,
}

/// Append-only audit trail of processed records
///
/// Entries carry the level, the processed field names and a digest of the
/// output record. Field values never reach the log.
pub struct AuditLogger {
    log_path: PathBuf,
    json_format: bool,
    // Serializes appends from concurrent callers
    write_lock: Mutex<()>,
}

impl AuditLogger {
    /// Create a new audit logger, creating the parent directory if needed
    pub fn new(log_path: PathBuf, json_format: bool) -> Result<Self> {
        if let Some(parent) = log_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    VeilError::Audit(format!(
                        "Failed to create audit log directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        Ok(Self {
            log_path,
            json_format,
            write_lock: Mutex::new(()),
        })
    }

    /// Path of the audit file
    pub fn log_path(&self) -> &PathBuf {
        &self.log_path
    }

    /// Log a processed record
    pub fn log_processing(&self, result: &ProcessingResult) -> Result<()> {
        let entry = AuditLogEntry {
            entry_id: Uuid::new_v4(),
            timestamp: result.metadata.processed_at.to_rfc3339(),
            level: result.metadata.level.to_string(),
            fields_processed: result.metadata.fields_processed.clone(),
            warnings_count: result.metadata.warnings.len(),
            output_digest: Self::digest_output(result)?,
        };

        self.write_entry(&entry)
    }

    /// SHA-256 of the serialized output record
    fn digest_output(result: &ProcessingResult) -> Result<String> {
        let bytes = serde_json::to_vec(&result.record)?;
        Ok(format!("{:x}", Sha256::digest(bytes)))
    }

    /// Write an audit entry to the log file
    fn write_entry(&self, entry: &AuditLogEntry) -> Result<()> {
        let line = if self.json_format {
            serde_json::to_string(entry)?
        } else {
            format!(
                "[{}] Level: {} | Fields: {} | Warnings: {} | Digest: {}",
                entry.timestamp,
                entry.level,
                entry.fields_processed.join(","),
                entry.warnings_count,
                entry.output_digest
            )
        };

        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| VeilError::Audit("audit log lock poisoned".to_string()))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| {
                VeilError::Audit(format!(
                    "Failed to open audit log {}: {}",
                    self.log_path.display(),
                    e
                ))
            })?;

        writeln!(file, "{line}")
            .map_err(|e| VeilError::Audit(format!("Failed to write audit entry: {e}")))?;

        Ok(())
    }
}

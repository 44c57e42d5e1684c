//! Integration tests for configuration loading and processor construction
//!
//! Tests that read or modify environment variables hold ENV_MUTEX so they do
//! not interfere with each other.

use secrecy::ExposeSecret;
use serde_json::json;
use std::io::Write;
use std::sync::{Mutex, MutexGuard};
use tempfile::NamedTempFile;
use veil::config::load_config;
use veil::privacy::{GeneralizationRule, PrivacyLevel, PrivacyProcessor};

// Mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

const KEY_B64: &str = "MDEyMzQ1Njc4OWFiY2RlZjAxMjM0NTY3ODlhYmNkZWY=";

fn env_lock() -> MutexGuard<'static, ()> {
    let guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    guard
}

/// Helper function to clean up environment variables
fn cleanup_env_vars() {
    for var in [
        "VEIL_APPLICATION_LOG_LEVEL",
        "VEIL_PRIVACY_KEY",
        "VEIL_PRIVACY_DEFAULT_LEVEL",
        "VEIL_PRIVACY_SENSITIVE_FIELDS",
        "VEIL_PRIVACY_EPSILON",
        "VEIL_AUDIT_ENABLED",
        "VEIL_AUDIT_LOG_PATH",
        "PRIVACY_KEY",
        "TEST_VEIL_KEY",
    ] {
        std::env::remove_var(var);
    }
}

fn write_config(content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(content.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

#[test]
fn test_load_complete_config() {
    let _lock = env_lock();
    let file = write_config(&format!(
        r#"
[application]
log_level = "debug"

[privacy]
key = "{KEY_B64}"
default_level = "differential"
sensitive_fields = ["session_seconds", "age"]
epsilon = 0.5
sensitivity = 2.0
synthetic_sigma = 0.2

[privacy.generalization.age]
kind = "numeric_range"
width = 5

[privacy.generalization.city]
kind = "prefix"
delimiter = "-"

[audit]
enabled = false
log_path = "audit/veil.log"
json_format = false

[logging]
local_enabled = false
local_rotation = "hourly"
"#
    ));

    let config = load_config(file.path()).expect("Failed to load config");

    assert_eq!(config.application.log_level, "debug");
    assert_eq!(config.privacy.default_level, PrivacyLevel::Differential);
    assert_eq!(config.privacy.sensitive_fields, ["session_seconds", "age"]);
    assert_eq!(config.privacy.epsilon, 0.5);
    assert_eq!(config.privacy.sensitivity, 2.0);
    assert_eq!(config.privacy.synthetic_sigma, 0.2);
    assert_eq!(
        config.privacy.generalization.get("city"),
        Some(&GeneralizationRule::Prefix {
            delimiter: "-".to_string()
        })
    );
    assert!(!config.audit.json_format);
    assert_eq!(config.logging.local_rotation, "hourly");
}

#[test]
fn test_processor_from_config_uses_rules() {
    let _lock = env_lock();
    let file = write_config(&format!(
        r#"
[privacy]
key = "{KEY_B64}"

[privacy.generalization.age]
kind = "numeric_range"
width = 5
"#
    ));

    let config = load_config(file.path()).unwrap();
    let processor = PrivacyProcessor::from_config(&config.privacy, &config.audit).unwrap();
    assert!(processor.has_key());

    let result = processor
        .process(&json!({"age": 42}), PrivacyLevel::Generalized, &["age"])
        .unwrap();
    assert_eq!(result.record["age"], json!("40-44"));
}

#[test]
fn test_env_var_substitution() {
    let _lock = env_lock();
    std::env::set_var("TEST_VEIL_KEY", KEY_B64);

    let file = write_config("[privacy]\nkey = \"${TEST_VEIL_KEY}\"\n");
    let config = load_config(file.path()).unwrap();

    assert_eq!(
        config.privacy.key.as_ref().unwrap().expose_secret().as_ref(),
        KEY_B64
    );
    cleanup_env_vars();
}

#[test]
fn test_missing_substitution_variable() {
    let _lock = env_lock();
    let file = write_config("[privacy]\nkey = \"${TEST_VEIL_KEY}\"\n");

    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("TEST_VEIL_KEY"));
}

#[test]
fn test_env_var_overrides() {
    let _lock = env_lock();
    std::env::set_var("VEIL_APPLICATION_LOG_LEVEL", "warn");
    std::env::set_var("VEIL_PRIVACY_DEFAULT_LEVEL", "REDACTED");
    std::env::set_var("VEIL_PRIVACY_SENSITIVE_FIELDS", "email, ip ,");
    std::env::set_var("VEIL_PRIVACY_EPSILON", "0.25");

    let file = write_config("[privacy]\nepsilon = 1.0\n");
    let config = load_config(file.path()).unwrap();

    assert_eq!(config.application.log_level, "warn");
    assert_eq!(config.privacy.default_level, PrivacyLevel::Redacted);
    assert_eq!(config.privacy.sensitive_fields, ["email", "ip"]);
    assert_eq!(config.privacy.epsilon, 0.25);
    cleanup_env_vars();
}

#[test]
fn test_invalid_override_is_reported() {
    let _lock = env_lock();
    std::env::set_var("VEIL_PRIVACY_DEFAULT_LEVEL", "top-secret");

    let file = write_config("");
    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("VEIL_PRIVACY_DEFAULT_LEVEL"));
    cleanup_env_vars();
}

#[test]
fn test_privacy_key_env_fallback() {
    let _lock = env_lock();
    std::env::set_var("PRIVACY_KEY", KEY_B64);

    let file = write_config("[privacy]\ndefault_level = \"tokenized\"\n");
    let config = load_config(file.path()).unwrap();
    assert!(config.privacy.key.is_none());

    let processor = PrivacyProcessor::from_config(&config.privacy, &config.audit).unwrap();
    assert!(processor.has_key());
    cleanup_env_vars();
}

#[test]
fn test_processor_without_any_key() {
    let _lock = env_lock();
    let file = write_config("");
    let config = load_config(file.path()).unwrap();

    let processor = PrivacyProcessor::from_config(&config.privacy, &config.audit).unwrap();
    assert!(!processor.has_key());
}

#[test]
fn test_invalid_config_validation() {
    let _lock = env_lock();
    for content in [
        "[application]\nlog_level = \"loud\"\n",
        "[privacy]\nepsilon = 0.0\n",
        "[privacy]\nsensitive_fields = [\"\"]\n",
        "[privacy.generalization.age]\nkind = \"numeric_range\"\nwidth = 0\n",
        "[logging]\nlocal_rotation = \"weekly\"\n",
        "[privacy]\ndefault_level = \"public\"\n",
    ] {
        let file = write_config(content);
        assert!(load_config(file.path()).is_err(), "accepted: {content}");
    }
}

#[test]
fn test_audit_enabled_from_config() {
    let _lock = env_lock();
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("audit.log");
    let file = write_config(&format!(
        "[audit]\nenabled = true\nlog_path = {:?}\n",
        log_path.to_string_lossy()
    ));

    let config = load_config(file.path()).unwrap();
    let processor = PrivacyProcessor::from_config(&config.privacy, &config.audit).unwrap();
    processor
        .process(&json!({"ip": "10.0.0.1"}), PrivacyLevel::Redacted, &["ip"])
        .unwrap();

    let content = std::fs::read_to_string(&log_path).unwrap();
    assert_eq!(content.lines().count(), 1);
    assert!(!content.contains("10.0.0.1"));
}

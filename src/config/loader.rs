//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::VeilConfig;
use super::secret::secret_string;
use crate::domain::errors::VeilError;
use crate::domain::result::Result;
use crate::privacy::level::PrivacyLevel;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into VeilConfig
/// 4. Applies environment variable overrides (VEIL_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use veil::config::loader::load_config;
///
/// let config = load_config("veil.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<VeilConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(VeilError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        VeilError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses configuration text, applying substitution, overrides and validation
pub fn parse_config(contents: &str) -> Result<VeilConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: VeilConfig = toml::from_str(&contents)
        .map_err(|e| VeilError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        VeilError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| VeilError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let processed = re.replace_all(line, |caps: &regex::Captures<'_>| {
            let var_name = &caps[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    String::new()
                }
            }
        });
        result.push_str(&processed);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(VeilError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using VEIL_* prefix
///
/// Environment variables follow the pattern: VEIL_<SECTION>_<KEY>
/// For example: VEIL_PRIVACY_EPSILON, VEIL_AUDIT_ENABLED
fn apply_env_overrides(config: &mut VeilConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("VEIL_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Privacy overrides
    if let Ok(val) = std::env::var("VEIL_PRIVACY_KEY") {
        config.privacy.key = Some(secret_string(val));
    }
    if let Ok(val) = std::env::var("VEIL_PRIVACY_DEFAULT_LEVEL") {
        config.privacy.default_level = val
            .parse::<PrivacyLevel>()
            .map_err(|e| VeilError::Configuration(format!("VEIL_PRIVACY_DEFAULT_LEVEL: {e}")))?;
    }
    if let Ok(val) = std::env::var("VEIL_PRIVACY_SENSITIVE_FIELDS") {
        config.privacy.sensitive_fields = val
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect();
    }
    if let Ok(val) = std::env::var("VEIL_PRIVACY_EPSILON") {
        config.privacy.epsilon = parse_number("VEIL_PRIVACY_EPSILON", &val)?;
    }
    if let Ok(val) = std::env::var("VEIL_PRIVACY_SENSITIVITY") {
        config.privacy.sensitivity = parse_number("VEIL_PRIVACY_SENSITIVITY", &val)?;
    }
    if let Ok(val) = std::env::var("VEIL_PRIVACY_SYNTHETIC_SIGMA") {
        config.privacy.synthetic_sigma = parse_number("VEIL_PRIVACY_SYNTHETIC_SIGMA", &val)?;
    }

    // Audit overrides
    if let Ok(val) = std::env::var("VEIL_AUDIT_ENABLED") {
        config.audit.enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("VEIL_AUDIT_LOG_PATH") {
        config.audit.log_path = val.into();
    }

    // Logging overrides
    if let Ok(val) = std::env::var("VEIL_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("VEIL_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

fn parse_number(var: &str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse()
        .map_err(|e| VeilError::Configuration(format!("{var}: invalid number '{value}': {e}")))
}

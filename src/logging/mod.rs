//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Configurable log levels, overridable through `RUST_LOG`
//! - Console output on stderr
//! - JSON file logging with rotation
//!
//! Field values are never logged; events carry levels, field names and counts.
//!
//! # Example
//!
//! ```no_run
//! use veil::logging::init_logging;
//! use veil::config::LoggingConfig;
//!
//! let _guard = init_logging("info", &LoggingConfig::console()).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the completion of a batch
///
/// # Example
///
/// ```no_run
/// use veil::log_batch_complete;
/// use veil::privacy::PrivacyLevel;
///
/// log_batch_complete!(PrivacyLevel::Redacted, 100, 2);
/// ```
#[macro_export]
macro_rules! log_batch_complete {
    ($level:expr, $total:expr, $failed:expr) => {
        tracing::info!(
            level = %$level,
            total = $total,
            failed = $failed,
            succeeded = $total - $failed,
            "Batch processed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use veil::log_error_with_context;
/// use veil::domain::VeilError;
///
/// let error = VeilError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

//! Audit logging module
//!
//! Provides an append-only audit trail for privacy processing.

pub mod logger;

pub use logger::AuditLogger;

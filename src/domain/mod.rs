//! Domain types for Veil.
//!
//! The domain layer provides:
//! - **Records** ([`Record`]): the ordered field-name-to-value mapping the
//!   privacy engine transforms
//! - **Error types** ([`PrivacyError`], [`VeilError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! Engine calls return `Result<T, PrivacyError>`; application code converts
//! them into [`VeilError`] with the `?` operator:
//!
//! ```rust
//! use veil::domain::{PrivacyError, Result};
//!
//! fn engine_call() -> std::result::Result<(), PrivacyError> {
//!     Ok(())
//! }
//!
//! fn example() -> Result<()> {
//!     engine_call()?;
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod record;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{PrivacyError, VeilError};
pub use record::{field_text, is_numeric, Record};
pub use result::Result;

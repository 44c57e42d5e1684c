//! Secret configuration values
//!
//! The privacy key is held in a [`SecretString`]: the `secrecy` wrapper keeps
//! it out of `Debug` output and zeroizes the buffer on drop. Code that needs
//! the value must call `expose_secret()` explicitly.
//!
//! # Example
//!
//! ```rust
//! use veil::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let key = secret_string("MDEyMzQ1Njc4OWFiY2RlZg==".to_string());
//! assert_eq!(key.expose_secret().as_ref(), "MDEyMzQ1Njc4OWFiY2RlZg==");
//! assert!(!format!("{key:?}").contains("MDEy"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret};
use serde::{Deserialize, Deserializer};
use zeroize::Zeroize;

/// String newtype that can live inside a [`Secret`]
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SecretValue {
    /// Whether the value is empty or whitespace only
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretValue)
    }
}

/// Zeroizing, debug-redacted string
pub type SecretString = Secret<SecretValue>;

/// Wraps a string as a [`SecretString`]
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_secret_string_creation() {
        let secret = secret_string("key-material".to_string());
        assert_eq!(secret.expose_secret().as_ref(), "key-material");
    }

    #[test]
    fn test_secret_debug_redacted() {
        let secret = secret_string("sensitive-data".to_string());
        let debug_output = format!("{secret:?}");

        assert!(!debug_output.contains("sensitive-data"));
        assert!(debug_output.contains("REDACTED"));
    }

    #[test]
    fn test_blank_detection() {
        assert!(secret_string("   ".to_string()).expose_secret().is_blank());
        assert!(!secret_string("k".to_string()).expose_secret().is_blank());
    }

    #[test]
    fn test_secret_deserialize() {
        #[derive(Deserialize)]
        struct KeyHolder {
            key: SecretString,
        }

        let holder: KeyHolder = toml::from_str("key = \"abc123\"").unwrap();
        assert_eq!(holder.key.expose_secret().as_ref(), "abc123");
    }
}

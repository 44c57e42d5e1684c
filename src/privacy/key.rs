//! Secret key material for keyed transforms
//!
//! The engine never generates or persists keys. A [`SecretKey`] is built from
//! externally supplied bytes (configuration, secret store, `PRIVACY_KEY`) and is
//! shared read-only by the encryption, tokenization and pseudonymization
//! transforms.

use crate::domain::errors::PrivacyError;
use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine as _;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretVec};
use sha2::{Digest, Sha256};
use std::fmt;
use zeroize::Zeroizing;

/// HMAC-SHA256 as used by tokenization and pseudonymization
pub type HmacSha256 = Hmac<Sha256>;

/// Environment variable consulted when no key is configured
pub const PRIVACY_KEY_ENV: &str = "PRIVACY_KEY";

/// Process-wide symmetric secret
///
/// The bytes are zeroized on drop and never appear in `Debug` output.
pub struct SecretKey {
    secret: SecretVec<u8>,
}

impl SecretKey {
    /// Minimum accepted secret length in bytes
    pub const MIN_LEN: usize = 16;

    /// Creates a key from raw secret bytes
    ///
    /// # Errors
    ///
    /// Returns [`PrivacyError::InvalidInput`] if the secret is shorter than
    /// [`SecretKey::MIN_LEN`] bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self, PrivacyError> {
        let bytes = bytes.into();
        if bytes.len() < Self::MIN_LEN {
            let len = bytes.len();
            drop(Zeroizing::new(bytes));
            return Err(PrivacyError::InvalidInput(format!(
                "secret key must be at least {} bytes, got {}",
                Self::MIN_LEN,
                len
            )));
        }
        Ok(Self {
            secret: SecretVec::new(bytes),
        })
    }

    /// Creates a key from base64 text (standard or URL-safe alphabet)
    ///
    /// URL-safe padded keys, as produced by common key generators, are
    /// accepted alongside the standard alphabet.
    pub fn from_base64(encoded: &str) -> Result<Self, PrivacyError> {
        let encoded = encoded.trim();
        let decoded = STANDARD
            .decode(encoded)
            .or_else(|_| URL_SAFE.decode(encoded))
            .map_err(|_| {
                PrivacyError::InvalidInput("secret key is not valid base64".to_string())
            })?;
        Self::from_bytes(decoded)
    }

    /// Reads a base64 key from the `PRIVACY_KEY` environment variable
    ///
    /// Returns `Ok(None)` when the variable is unset or empty.
    pub fn from_env() -> Result<Option<Self>, PrivacyError> {
        match std::env::var(PRIVACY_KEY_ENV) {
            Ok(value) if !value.trim().is_empty() => {
                let value = Zeroizing::new(value);
                Self::from_base64(&value).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// AES-256 key derived from the secret
    pub(crate) fn cipher_key(&self) -> Zeroizing<[u8; 32]> {
        let digest = Sha256::digest(self.secret.expose_secret());
        let mut key = Zeroizing::new([0u8; 32]);
        key.copy_from_slice(&digest);
        key
    }

    /// Fresh HMAC-SHA256 instance keyed with the secret
    pub(crate) fn mac(&self) -> Result<HmacSha256, PrivacyError> {
        HmacSha256::new_from_slice(self.secret.expose_secret())
            .map_err(|_| PrivacyError::processing_msg("failed to initialise HMAC"))
    }

    /// Lowercase hex HMAC-SHA256 over the concatenated parts
    pub(crate) fn keyed_digest_hex(&self, parts: &[&[u8]]) -> Result<String, PrivacyError> {
        let mut mac = self.mac()?;
        for part in parts {
            mac.update(part);
        }
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey([REDACTED])")
    }
}

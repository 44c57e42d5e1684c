//! Field encryption (raw level)
//!
//! Values are sealed with AES-256-GCM under a key derived from the process
//! secret. Each field gets a fresh random 96-bit nonce; the stored form is
//! `base64(nonce || ciphertext || tag)`.
//!
//! Decryption always yields a string: the text that was encrypted (see
//! [`field_text`]), not the original JSON type. `42` round-trips to `"42"`.
//!
//! `null` fields stay `null` and are left out of `fields_processed`. Other
//! falsy values such as `0`, `false` and `""` are encrypted.

use super::{FieldReport, Transform, TransformContext};
use crate::domain::errors::PrivacyError;
use crate::domain::record::{field_text, Record};
use crate::privacy::key::SecretKey;
use crate::privacy::level::PrivacyLevel;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rand::RngCore;
use serde_json::Value;

const NONCE_SIZE: usize = 12;
const TAG_SIZE: usize = 16;

/// Encrypts requested fields with authenticated encryption
#[derive(Debug, Default)]
pub struct Encryption;

impl Encryption {
    pub fn new() -> Self {
        Self
    }
}

impl Transform for Encryption {
    fn level(&self) -> PrivacyLevel {
        PrivacyLevel::Raw
    }

    fn apply(
        &self,
        record: &mut Record,
        fields: &[String],
        ctx: &mut TransformContext<'_>,
    ) -> Result<FieldReport, PrivacyError> {
        let key = ctx.require_key("encryption")?;
        let mut report = FieldReport::default();

        for field in fields {
            let Some(value) = record.get_mut(field) else {
                continue;
            };
            if value.is_null() {
                continue;
            }
            let sealed = encrypt_text(key, &field_text(value), &mut *ctx.rng)?;
            *value = Value::String(sealed);
            report.processed(field);
        }

        Ok(report)
    }
}

/// Encrypts text, returning the base64 envelope
pub fn encrypt_text(
    key: &SecretKey,
    plaintext: &str,
    rng: &mut dyn RngCore,
) -> Result<String, PrivacyError> {
    let cipher_key = key.cipher_key();
    let cipher = Aes256Gcm::new_from_slice(cipher_key.as_slice())
        .map_err(|_| PrivacyError::processing_msg("invalid encryption key length"))?;

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|_| PrivacyError::processing_msg("field encryption failed"))?;

    let mut envelope = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    envelope.extend_from_slice(&nonce_bytes);
    envelope.extend_from_slice(&ciphertext);
    Ok(STANDARD.encode(envelope))
}

/// Decrypts a base64 envelope produced by [`encrypt_text`]
///
/// # Errors
///
/// Returns [`PrivacyError::Integrity`] if the envelope is malformed, was
/// modified, or was sealed under a different key.
pub fn decrypt_text(key: &SecretKey, envelope: &str) -> Result<String, PrivacyError> {
    let bytes = STANDARD
        .decode(envelope.trim())
        .map_err(|_| PrivacyError::Integrity("ciphertext is not valid base64".to_string()))?;

    if bytes.len() < NONCE_SIZE + TAG_SIZE {
        return Err(PrivacyError::Integrity("ciphertext too short".to_string()));
    }

    let cipher_key = key.cipher_key();
    let cipher = Aes256Gcm::new_from_slice(cipher_key.as_slice())
        .map_err(|_| PrivacyError::processing_msg("invalid encryption key length"))?;

    let (nonce_bytes, sealed) = bytes.split_at(NONCE_SIZE);
    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce_bytes), sealed)
        .map_err(|_| {
            PrivacyError::Integrity("authentication failed: tampered ciphertext or wrong key".to_string())
        })?;

    String::from_utf8(plaintext)
        .map_err(|_| PrivacyError::Integrity("decrypted payload is not UTF-8".to_string()))
}

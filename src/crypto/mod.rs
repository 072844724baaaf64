//! Shared cryptographic primitives: keyed HMAC-SHA256 and AES-256-GCM.
//!
//! HMAC output is available as hex or base64, the two encodings the signed
//! surfaces use. AEAD ciphertexts are laid out as `iv || ciphertext || tag`,
//! with a fresh randomly generated 12-byte IV for every encryption. The
//! 16-byte GCM tag authenticates the payload, so any tampering fails
//! decryption outright.

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Output encoding for [`hmac_sha256`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HmacFormat {
    /// Standard base64 with padding.
    Base64,
    /// Lowercase hex.
    Hex,
}

/// Computes a keyed HMAC-SHA256 over `payload`.
///
/// Used both for cookie signatures and for validating the query-string
/// signature attached to OAuth callbacks.
#[must_use]
#[allow(clippy::missing_panics_doc)] // HMAC accepts any key size
pub fn hmac_sha256(secret: &str, payload: &str, format: HmacFormat) -> String {
    let mut mac =
        <HmacSha256 as Mac>::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(payload.as_bytes());
    let digest = mac.finalize().into_bytes();
    match format {
        HmacFormat::Base64 => BASE64.encode(digest),
        HmacFormat::Hex => hex::encode(digest),
    }
}

/// Required key length in bytes for AES-256-GCM.
pub const KEY_LEN: usize = 32;

/// IV (nonce) length in bytes.
pub const IV_LEN: usize = 12;

/// Authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// Errors from the AES-GCM layer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// The supplied key is not the right length for AES-256.
    #[error("invalid key length: expected {expected} bytes, got {got}")]
    InvalidKeyLength { expected: usize, got: usize },

    /// The ciphertext is too short to contain an IV and tag.
    #[error("ciphertext too short to contain IV and authentication tag")]
    DataTooShort,

    /// Encryption failed.
    #[error("encryption failed")]
    EncryptionFailed,

    /// Decryption failed, either from tampering or a wrong key.
    #[error("decryption failed")]
    DecryptionFailed,
}

/// Generates a fresh random 12-byte IV.
#[must_use]
pub fn generate_iv() -> [u8; IV_LEN] {
    Aes256Gcm::generate_nonce(&mut OsRng).into()
}

/// Encrypts `plaintext` under `key`, returning `iv || ciphertext || tag`.
///
/// A fresh random IV is generated per call, so encrypting the same plaintext
/// twice yields different outputs.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidKeyLength`] if `key` is not 32 bytes, or
/// [`CryptoError::EncryptionFailed`] if the cipher rejects the input.
pub fn encrypt(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let cipher = cipher_for(key)?;
    let iv = generate_iv();

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&iv), plaintext)
        .map_err(|_| CryptoError::EncryptionFailed)?;

    let mut out = Vec::with_capacity(IV_LEN + ciphertext.len());
    out.extend_from_slice(&iv);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Decrypts data produced by [`encrypt`].
///
/// # Errors
///
/// Returns [`CryptoError::InvalidKeyLength`] for a bad key,
/// [`CryptoError::DataTooShort`] when the payload cannot contain an IV plus
/// tag, and [`CryptoError::DecryptionFailed`] when authentication fails.
pub fn decrypt(key: &[u8], data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let cipher = cipher_for(key)?;

    if data.len() < IV_LEN + TAG_LEN {
        return Err(CryptoError::DataTooShort);
    }

    let (iv, ciphertext) = data.split_at(IV_LEN);
    cipher
        .decrypt(Nonce::from_slice(iv), ciphertext)
        .map_err(|_| CryptoError::DecryptionFailed)
}

fn cipher_for(key: &[u8]) -> Result<Aes256Gcm, CryptoError> {
    Aes256Gcm::new_from_slice(key).map_err(|_| CryptoError::InvalidKeyLength {
        expected: KEY_LEN,
        got: key.len(),
    })
}

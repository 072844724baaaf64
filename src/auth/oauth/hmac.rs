//! HMAC-SHA256 validation for OAuth callbacks.
//!
//! # Security
//!
//! All comparisons are constant-time to prevent timing attacks. Validation
//! supports key rotation by checking every configured secret, newest first.

use subtle::ConstantTimeEq;

use crate::auth::oauth::AuthQuery;
use crate::config::Config;
use crate::crypto::{hmac_sha256, HmacFormat};

/// Computes an HMAC-SHA256 signature for the given message.
///
/// Returned as lowercase hex, the encoding the platform uses for callback
/// query signatures.
///
/// # Example
///
/// ```rust
/// use shopify_app_auth::auth::oauth::hmac::compute_signature;
///
/// let sig = compute_signature("code=abc&shop=x.myshopify.com", "secret-key");
/// assert_eq!(sig.len(), 64); // 32 bytes as hex
/// ```
#[must_use]
pub fn compute_signature(message: &str, secret: &str) -> String {
    hmac_sha256(secret, message, HmacFormat::Hex)
}

/// Constant-time string comparison.
///
/// Used for HMAC and state comparisons so mismatches take the same time as
/// matches regardless of where the strings differ.
#[must_use]
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    // ConstantTimeEq handles different lengths securely
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Validates the HMAC signature of an OAuth callback.
///
/// The signed message is every query parameter except `hmac` and
/// `signature`, sorted by key and joined as `key=value` pairs with `&`.
///
/// # Key Rotation
///
/// Each secret from [`Config::signing_keys`] is tried in turn, so callbacks
/// signed with a recently rotated-out secret still verify.
#[must_use]
pub fn validate_hmac(query: &AuthQuery, config: &Config) -> bool {
    let Some(received) = query.hmac() else {
        return false;
    };
    let signable = query.to_signable_string();

    config.signing_keys().iter().any(|secret| {
        let computed = compute_signature(&signable, secret.as_ref());
        constant_time_compare(&computed, received)
    })
}

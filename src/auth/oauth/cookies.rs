//! Signed cookies carrying OAuth state across the redirect round trip.
//!
//! Each signed cookie is a pair: `{name}` holds the value and `{name}.sig`
//! holds a hex HMAC-SHA256 of it. Verification recomputes the signature
//! against every configured secret, so cookies written before a key
//! rotation still verify. New signatures always use the current secret.

use crate::auth::oauth::hmac::{compute_signature, constant_time_compare};
use crate::config::Config;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};

/// Name of the cookie holding the OAuth state nonce.
pub const STATE_COOKIE_NAME: &str = "shopify_app_state";

/// Name of the cookie holding the session id for non-embedded apps.
pub const SESSION_COOKIE_NAME: &str = "shopify_app_session";

const SIGNATURE_SUFFIX: &str = ".sig";

#[derive(Clone, Debug, PartialEq, Eq)]
struct CookieData {
    value: String,
    expires: Option<DateTime<Utc>>,
}

/// A jar of received and outgoing cookies with HMAC signing.
///
/// Built from a request's `Cookie` header; mutations accumulate and render
/// as `Set-Cookie` headers for the response.
///
/// # Example
///
/// ```rust
/// use shopify_app_auth::auth::oauth::SignedCookieJar;
/// use shopify_app_auth::Config;
///
/// let config = Config::builder()
///     .api_key("key")
///     .api_secret_key("secret")
///     .build()
///     .unwrap();
///
/// let mut jar = SignedCookieJar::from_header(None, &config);
/// jar.set_and_sign("shopify_app_state", "nonce123", None);
///
/// let headers = jar.to_set_cookie_headers();
/// assert_eq!(headers.len(), 2); // value cookie plus its .sig
/// ```
#[derive(Clone, Debug)]
pub struct SignedCookieJar {
    received: HashMap<String, String>,
    outgoing: BTreeMap<String, CookieData>,
    keys: Vec<String>,
}

impl SignedCookieJar {
    /// Builds a jar from a request's `Cookie` header, if any.
    #[must_use]
    pub fn from_header(cookie_header: Option<&str>, config: &Config) -> Self {
        let received = cookie_header.map_or_else(HashMap::new, parse_cookie_header);
        let keys = config
            .signing_keys()
            .into_iter()
            .map(|k| k.as_ref().to_string())
            .collect();
        Self {
            received,
            outgoing: BTreeMap::new(),
            keys,
        }
    }

    /// Returns a received cookie's raw value without verifying anything.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.received.get(name).map(String::as_str)
    }

    /// Returns `true` if `name` is present with a valid signature cookie.
    ///
    /// On any failure, value or signature missing, empty, or not verifying
    /// against any configured key, both cookies are queued for deletion so a
    /// failed pair cannot be replayed.
    pub fn is_signed_cookie_valid(&mut self, name: &str) -> bool {
        let valid = self.check_signature(name);
        if !valid {
            self.delete(name);
        }
        valid
    }

    fn check_signature(&self, name: &str) -> bool {
        let Some(value) = self.received.get(name).filter(|v| !v.is_empty()) else {
            return false;
        };
        let signature = self.received.get(&format!("{name}{SIGNATURE_SUFFIX}"));
        let Some(signature) = signature.filter(|s| !s.is_empty()) else {
            return false;
        };

        self.keys.iter().any(|key| {
            let computed = compute_signature(value, key);
            constant_time_compare(&computed, signature)
        })
    }

    /// Returns a received cookie's value after verifying its signature.
    ///
    /// `None` when the cookie or its signature is missing or the signature
    /// does not verify against any configured key. Failure clears both
    /// cookies, as with [`Self::is_signed_cookie_valid`].
    pub fn get_and_verify(&mut self, name: &str) -> Option<String> {
        if self.is_signed_cookie_valid(name) {
            self.received.get(name).cloned()
        } else {
            None
        }
    }

    /// Queues a plain outgoing cookie.
    pub fn set(&mut self, name: &str, value: impl Into<String>, expires: Option<DateTime<Utc>>) {
        self.outgoing.insert(
            name.to_string(),
            CookieData {
                value: value.into(),
                expires,
            },
        );
    }

    /// Queues an outgoing cookie together with its signature cookie.
    ///
    /// The signature is computed with the current secret only.
    pub fn set_and_sign(
        &mut self,
        name: &str,
        value: impl Into<String>,
        expires: Option<DateTime<Utc>>,
    ) {
        let value = value.into();
        let signature = compute_signature(&value, &self.keys[0]);
        self.set(&format!("{name}{SIGNATURE_SUFFIX}"), signature, expires);
        self.set(name, value, expires);
    }

    /// Queues deletion of a cookie and its signature cookie.
    ///
    /// Deletion is an empty value with an expiry in the past.
    pub fn delete(&mut self, name: &str) {
        let epoch = DateTime::<Utc>::UNIX_EPOCH;
        self.set(name, "", Some(epoch));
        self.set(&format!("{name}{SIGNATURE_SUFFIX}"), "", Some(epoch));
    }

    /// Renders queued cookies as `Set-Cookie` header values.
    #[must_use]
    pub fn to_set_cookie_headers(&self) -> Vec<String> {
        self.outgoing
            .iter()
            .map(|(name, data)| {
                let mut header = format!("{name}={}", data.value);
                if let Some(expires) = data.expires {
                    let formatted = expires.format("%a, %d %b %Y %H:%M:%S GMT");
                    header.push_str(&format!("; Expires={formatted}"));
                }
                header.push_str("; Path=/; Secure; HttpOnly; SameSite=Lax");
                header
            })
            .collect()
    }
}

fn parse_cookie_header(header: &str) -> HashMap<String, String> {
    header
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            Some((name.to_string(), value.to_string()))
        })
        .collect()
}

//! Session token (JWT) validation for embedded apps.
//!
//! Embedded apps receive short-lived HS256 session tokens from the Admin
//! frontend. [`JwtPayload`] decodes and validates them before they are
//! exchanged for access tokens.
//!
//! # Claims
//!
//! - `iss`: admin URL that issued the token, e.g. `https://shop.myshopify.com/admin`
//! - `dest`: the shop the token targets, e.g. `https://shop.myshopify.com`
//! - `aud`: the app's API key
//! - `sub`: user id, for tokens tied to a staff member
//! - `exp` / `nbf` / `iat`: validity window
//! - `jti`: unique token id
//! - `sid`: admin session id, when present
//!
//! # Key rotation
//!
//! Decoding first tries the current API secret and falls back to the old
//! one, so tokens signed moments before a rotation still validate.

use crate::auth::oauth::OAuthError;
use crate::config::Config;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

/// Leeway in seconds for `exp` and `nbf` checks.
///
/// Absorbs small clock skew between the platform and the app server.
const JWT_LEEWAY_SECS: u64 = 10;

/// Decoded claims of a session token.
///
/// # Thread Safety
///
/// `JwtPayload` is `Send + Sync`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JwtPayload {
    /// Issuer, the admin URL that minted the token.
    pub iss: String,

    /// Destination shop URL.
    pub dest: String,

    /// Audience. Must equal the app's API key.
    pub aud: String,

    /// Subject. Numeric user id for user-tied tokens.
    pub sub: Option<String>,

    /// Expiration (Unix seconds).
    pub exp: i64,

    /// Not-before (Unix seconds).
    pub nbf: i64,

    /// Issued-at (Unix seconds).
    pub iat: i64,

    /// Unique token id.
    pub jti: String,

    /// Admin session id, when present.
    pub sid: Option<String>,
}

impl JwtPayload {
    /// Decodes and validates a session token.
    ///
    /// Signature, `exp`, and `nbf` are always checked (HS256, 10s leeway).
    /// The `aud` claim is compared to the app's API key when
    /// `check_audience` is set; callers that only need the shop claim and
    /// verify the audience elsewhere can skip it.
    ///
    /// # Errors
    ///
    /// [`OAuthError::InvalidJwt`] when the signature does not verify under
    /// any configured secret, the token is outside its validity window, or
    /// the audience does not match.
    pub fn decode(token: &str, config: &Config, check_audience: bool) -> Result<Self, OAuthError> {
        let payload = match Self::decode_with_key(token, config.api_secret_key().as_ref()) {
            Ok(payload) => payload,
            Err(primary_err) => {
                let fallback = config
                    .old_api_secret_key()
                    .map(|old_key| Self::decode_with_key(token, old_key.as_ref()));
                match fallback {
                    Some(Ok(payload)) => payload,
                    // Report the current key's error when both fail
                    _ => {
                        return Err(OAuthError::InvalidJwt {
                            reason: format!("Error decoding session token: {primary_err}"),
                        })
                    }
                }
            }
        };

        if check_audience && payload.aud != config.api_key().as_ref() {
            return Err(OAuthError::InvalidJwt {
                reason: "Session token had invalid API key".to_string(),
            });
        }

        Ok(payload)
    }

    fn decode_with_key(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = JWT_LEEWAY_SECS;
        validation.validate_nbf = true;
        // Audience is checked manually after decoding
        validation.validate_aud = false;

        let key = DecodingKey::from_secret(secret.as_bytes());
        Ok(decode::<Self>(token, &key, &validation)?.claims)
    }

    /// The shop domain from the `dest` claim, scheme stripped.
    #[must_use]
    pub fn shop(&self) -> &str {
        self.dest
            .strip_prefix("https://")
            .unwrap_or(self.dest.as_str())
    }

    /// The user id, when the token is an admin token with a numeric `sub`.
    #[must_use]
    pub fn shopify_user_id(&self) -> Option<u64> {
        if !self.iss.ends_with("/admin") {
            return None;
        }
        self.sub
            .as_deref()
            .filter(|sub| !sub.is_empty() && sub.chars().all(|c| c.is_ascii_digit()))
            .and_then(|sub| sub.parse().ok())
    }
}

// Verify JwtPayload is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<JwtPayload>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Serialize;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[derive(Debug, Serialize)]
    struct TestClaims {
        iss: String,
        dest: String,
        aud: String,
        sub: Option<String>,
        exp: i64,
        nbf: i64,
        iat: i64,
        jti: String,
        sid: Option<String>,
    }

    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64
    }

    fn config(secret: &str) -> Config {
        Config::builder()
            .api_key("test-api-key")
            .api_secret_key(secret)
            .build()
            .unwrap()
    }

    fn config_with_old_key(secret: &str, old_secret: &str) -> Config {
        Config::builder()
            .api_key("test-api-key")
            .api_secret_key(secret)
            .old_api_secret_key(old_secret)
            .build()
            .unwrap()
    }

    fn valid_claims() -> TestClaims {
        TestClaims {
            iss: "https://test-shop.myshopify.com/admin".to_string(),
            dest: "https://test-shop.myshopify.com".to_string(),
            aud: "test-api-key".to_string(),
            sub: Some("12345".to_string()),
            exp: now() + 300,
            nbf: now() - 10,
            iat: now(),
            jti: "unique-jwt-id".to_string(),
            sid: Some("session-id".to_string()),
        }
    }

    fn encode_jwt(claims: &TestClaims, secret: &str) -> String {
        let header = Header::new(Algorithm::HS256);
        let key = EncodingKey::from_secret(secret.as_bytes());
        encode(&header, claims, &key).unwrap()
    }

    #[test]
    fn test_decodes_valid_token() {
        let token = encode_jwt(&valid_claims(), "secret");
        let payload = JwtPayload::decode(&token, &config("secret"), true).unwrap();

        assert_eq!(payload.dest, "https://test-shop.myshopify.com");
        assert_eq!(payload.shop(), "test-shop.myshopify.com");
        assert_eq!(payload.shopify_user_id(), Some(12345));
    }

    #[test]
    fn test_falls_back_to_old_secret() {
        let token = encode_jwt(&valid_claims(), "old-secret");
        let config = config_with_old_key("new-secret", "old-secret");
        assert!(JwtPayload::decode(&token, &config, true).is_ok());
    }

    #[test]
    fn test_fails_when_no_key_matches() {
        let token = encode_jwt(&valid_claims(), "wrong-secret");
        let config = config_with_old_key("new-secret", "old-secret");

        let result = JwtPayload::decode(&token, &config, true);
        match result {
            Err(OAuthError::InvalidJwt { reason }) => {
                assert!(reason.contains("Error decoding session token"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_audience_mismatch_fails_when_checked() {
        let mut claims = valid_claims();
        claims.aud = "some-other-app".to_string();
        let token = encode_jwt(&claims, "secret");

        let result = JwtPayload::decode(&token, &config("secret"), true);
        match result {
            Err(OAuthError::InvalidJwt { reason }) => {
                assert_eq!(reason, "Session token had invalid API key");
            }
            other => panic!("unexpected result: {other:?}"),
        }

        // The same token passes with the audience check disabled
        assert!(JwtPayload::decode(&token, &config("secret"), false).is_ok());
    }

    #[test]
    fn test_expired_token_fails() {
        let mut claims = valid_claims();
        claims.exp = now() - 3600;
        let token = encode_jwt(&claims, "secret");
        assert!(JwtPayload::decode(&token, &config("secret"), true).is_err());
    }

    #[test]
    fn test_expiry_within_leeway_is_accepted() {
        let mut claims = valid_claims();
        claims.exp = now() - 5;
        let token = encode_jwt(&claims, "secret");
        assert!(JwtPayload::decode(&token, &config("secret"), true).is_ok());
    }

    #[test]
    fn test_not_yet_valid_token_fails() {
        let mut claims = valid_claims();
        claims.nbf = now() + 300;
        let token = encode_jwt(&claims, "secret");
        assert!(JwtPayload::decode(&token, &config("secret"), true).is_err());
    }

    #[test]
    fn test_malformed_token_fails() {
        let result = JwtPayload::decode("not-a-jwt", &config("secret"), true);
        assert!(matches!(result, Err(OAuthError::InvalidJwt { .. })));
    }

    #[test]
    fn test_user_id_requires_admin_issuer_and_numeric_sub() {
        let mut claims = valid_claims();
        claims.iss = "https://test-shop.myshopify.com".to_string();
        let token = encode_jwt(&claims, "secret");
        let payload = JwtPayload::decode(&token, &config("secret"), true).unwrap();
        assert_eq!(payload.shopify_user_id(), None);

        let mut claims = valid_claims();
        claims.sub = Some("not-a-number".to_string());
        let token = encode_jwt(&claims, "secret");
        let payload = JwtPayload::decode(&token, &config("secret"), true).unwrap();
        assert_eq!(payload.shopify_user_id(), None);

        let mut claims = valid_claims();
        claims.sub = None;
        let token = encode_jwt(&claims, "secret");
        let payload = JwtPayload::decode(&token, &config("secret"), true).unwrap();
        assert_eq!(payload.shopify_user_id(), None);
    }
}

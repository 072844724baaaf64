//! OAuth 2.0 Token Exchange (RFC 8693) for embedded apps.
//!
//! Embedded apps skip the redirect flow entirely: the Admin frontend hands
//! them a session token (JWT), and this module exchanges it for an access
//! token in a single POST.
//!
//! # Token types
//!
//! The exchange names its tokens with URNs:
//!
//! - Grant type: `urn:ietf:params:oauth:grant-type:token-exchange`
//! - Subject token type: `urn:ietf:params:oauth:token-type:id_token`
//! - Requested token types:
//!   - Online: `urn:shopify:params:oauth:token-type:online-access-token`
//!   - Offline: `urn:shopify:params:oauth:token-type:offline-access-token`
//!
//! Offline tokens can additionally be requested as expiring
//! (`expiring = "1"`), which makes the response carry a refresh token.

use crate::auth::oauth::jwt_payload::JwtPayload;
use crate::auth::oauth::{read_token_response, OAuthError};
use crate::auth::Session;
use crate::config::{Config, ShopDomain};
use serde::Serialize;

/// Grant type for token exchange (RFC 8693).
const TOKEN_EXCHANGE_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:token-exchange";

/// Subject token type for session tokens.
const ID_TOKEN_TYPE: &str = "urn:ietf:params:oauth:token-type:id_token";

/// Which kind of access token to request from the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestedTokenType {
    /// User-tied token that expires.
    OnlineAccessToken,
    /// App-level token.
    OfflineAccessToken,
}

impl RequestedTokenType {
    /// The URN the platform uses for this token type.
    #[must_use]
    pub const fn as_urn(self) -> &'static str {
        match self {
            Self::OnlineAccessToken => "urn:shopify:params:oauth:token-type:online-access-token",
            Self::OfflineAccessToken => "urn:shopify:params:oauth:token-type:offline-access-token",
        }
    }
}

/// Request body for token exchange.
#[derive(Debug, Serialize)]
struct TokenExchangeRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    grant_type: &'a str,
    subject_token: &'a str,
    subject_token_type: &'a str,
    requested_token_type: &'a str,
    expiring: &'a str,
}

/// Exchanges a session token for an access token.
///
/// The session token is fully validated before any network traffic: a
/// malformed or forged token fails with [`OAuthError::InvalidJwt`] without
/// touching the wire. `expiring` only applies to offline tokens and makes
/// the grant return a refresh token alongside a short-lived access token.
///
/// # Errors
///
/// - [`OAuthError::InvalidShop`] when `shop` is not a tenant domain.
/// - [`OAuthError::InvalidJwt`] when the session token fails validation
///   locally, or when the endpoint rejects it as `invalid_subject_token`.
/// - [`OAuthError::Response`] for other non-2xx endpoint responses.
pub async fn token_exchange(
    config: &Config,
    shop: &str,
    session_token: &str,
    requested_token_type: RequestedTokenType,
    expiring: bool,
) -> Result<Session, OAuthError> {
    let shop = ShopDomain::new(shop)?;
    JwtPayload::decode(session_token, config, true)?;

    let body = TokenExchangeRequest {
        client_id: config.api_key().as_ref(),
        client_secret: config.api_secret_key().as_ref(),
        grant_type: TOKEN_EXCHANGE_GRANT_TYPE,
        subject_token: session_token,
        subject_token_type: ID_TOKEN_TYPE,
        requested_token_type: requested_token_type.as_urn(),
        expiring: if expiring { "1" } else { "0" },
    };

    post_token_grant(&shop, &body).await
}

/// Exchanges a session token for an online access token.
///
/// Shorthand for [`token_exchange`] with
/// [`RequestedTokenType::OnlineAccessToken`] and `expiring = false`.
///
/// # Errors
///
/// See [`token_exchange`].
pub async fn exchange_online_token(
    config: &Config,
    shop: &str,
    session_token: &str,
) -> Result<Session, OAuthError> {
    token_exchange(
        config,
        shop,
        session_token,
        RequestedTokenType::OnlineAccessToken,
        false,
    )
    .await
}

/// Exchanges a session token for an offline access token.
///
/// Shorthand for [`token_exchange`] with
/// [`RequestedTokenType::OfflineAccessToken`] and `expiring = false`.
///
/// # Errors
///
/// See [`token_exchange`].
pub async fn exchange_offline_token(
    config: &Config,
    shop: &str,
    session_token: &str,
) -> Result<Session, OAuthError> {
    token_exchange(
        config,
        shop,
        session_token,
        RequestedTokenType::OfflineAccessToken,
        false,
    )
    .await
}

/// Migrates a non-expiring offline token to an expiring one.
///
/// One-time migration path for tokens issued before expiry existed. The
/// old access token itself is the subject of the exchange; both the subject
/// and requested token types are the offline URN and `expiring` is forced
/// on.
///
/// # Errors
///
/// - [`OAuthError::InvalidShop`] when `shop` is not a tenant domain.
/// - [`OAuthError::Response`] when the endpoint rejects the token.
pub async fn migrate_to_expiring_token(
    config: &Config,
    shop: &str,
    offline_access_token: &str,
) -> Result<Session, OAuthError> {
    let shop = ShopDomain::new(shop)?;
    let offline_urn = RequestedTokenType::OfflineAccessToken.as_urn();

    let body = TokenExchangeRequest {
        client_id: config.api_key().as_ref(),
        client_secret: config.api_secret_key().as_ref(),
        grant_type: TOKEN_EXCHANGE_GRANT_TYPE,
        subject_token: offline_access_token,
        subject_token_type: offline_urn,
        requested_token_type: offline_urn,
        expiring: "1",
    };

    post_token_grant(&shop, &body).await
}

async fn post_token_grant(
    shop: &ShopDomain,
    body: &TokenExchangeRequest<'_>,
) -> Result<Session, OAuthError> {
    let token_url = format!("https://{}/admin/oauth/access_token", shop.as_ref());

    let client = reqwest::Client::new();
    let response = client.post(&token_url).json(body).send().await?;

    let token_response = read_token_response(response).await?;
    Ok(Session::from_access_token_response(
        shop.clone(),
        "",
        &token_response,
    ))
}

// Verify types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<RequestedTokenType>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
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

    fn valid_jwt(shop: &str, secret: &str) -> String {
        let claims = TestClaims {
            iss: format!("https://{shop}/admin"),
            dest: format!("https://{shop}"),
            aud: "test-api-key".to_string(),
            sub: Some("12345".to_string()),
            exp: now() + 300,
            nbf: now() - 10,
            iat: now(),
            jti: "unique-jwt-id".to_string(),
            sid: Some("session-id".to_string()),
        };
        let header = Header::new(Algorithm::HS256);
        let key = EncodingKey::from_secret(secret.as_bytes());
        encode(&header, &claims, &key).unwrap()
    }

    #[tokio::test]
    async fn test_malformed_session_token_fails_without_network_call() {
        let result = exchange_offline_token(&config("secret"), "test-shop", "not-a-jwt").await;
        assert!(matches!(result, Err(OAuthError::InvalidJwt { .. })));
    }

    #[tokio::test]
    async fn test_forged_session_token_fails_without_network_call() {
        let token = valid_jwt("test-shop.myshopify.com", "attacker-secret");
        let result = exchange_offline_token(&config("secret"), "test-shop", &token).await;
        assert!(matches!(result, Err(OAuthError::InvalidJwt { .. })));
    }

    #[tokio::test]
    async fn test_invalid_shop_fails_before_jwt_or_network() {
        let result =
            exchange_offline_token(&config("secret"), "not a shop.example.com", "whatever").await;
        assert!(matches!(result, Err(OAuthError::InvalidShop(_))));
    }

    #[tokio::test]
    async fn test_valid_token_reaches_the_endpoint() {
        // The shop domain resolves to the real platform, so a fully valid
        // exchange fails at the network layer rather than during validation.
        let token = valid_jwt("test-shop.myshopify.com", "secret");
        let result = exchange_online_token(&config("secret"), "test-shop", &token).await;
        assert!(matches!(
            result,
            Err(OAuthError::Http(_) | OAuthError::Response(_))
        ));
    }

    #[tokio::test]
    async fn test_migration_skips_jwt_validation() {
        // The subject is an opaque access token, not a JWT, so validation
        // must not reject it locally.
        let result =
            migrate_to_expiring_token(&config("secret"), "test-shop", "shpat_opaque_token").await;
        assert!(matches!(
            result,
            Err(OAuthError::Http(_) | OAuthError::Response(_))
        ));
    }

    #[test]
    fn test_urn_constants() {
        assert_eq!(
            TOKEN_EXCHANGE_GRANT_TYPE,
            "urn:ietf:params:oauth:grant-type:token-exchange"
        );
        assert_eq!(ID_TOKEN_TYPE, "urn:ietf:params:oauth:token-type:id_token");
        assert_eq!(
            RequestedTokenType::OnlineAccessToken.as_urn(),
            "urn:shopify:params:oauth:token-type:online-access-token"
        );
        assert_eq!(
            RequestedTokenType::OfflineAccessToken.as_urn(),
            "urn:shopify:params:oauth:token-type:offline-access-token"
        );
    }

    #[test]
    fn test_request_body_serializes_expiring_as_string_flag() {
        let body = TokenExchangeRequest {
            client_id: "id",
            client_secret: "secret",
            grant_type: TOKEN_EXCHANGE_GRANT_TYPE,
            subject_token: "token",
            subject_token_type: ID_TOKEN_TYPE,
            requested_token_type: RequestedTokenType::OfflineAccessToken.as_urn(),
            expiring: "1",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["expiring"], "1");
        assert_eq!(
            json["grant_type"],
            "urn:ietf:params:oauth:grant-type:token-exchange"
        );
    }
}

//! OAuth 2.0 grant flows and callback plumbing.
//!
//! Every way an app can obtain an access token lives here:
//!
//! - **Authorization code**: the browser redirect flow, split into
//!   [`begin_auth`] and [`validate_auth_callback`].
//! - **Token exchange**: embedded apps trade an Admin session token for an
//!   access token via [`token_exchange`] and its
//!   [`exchange_online_token`] / [`exchange_offline_token`] shorthands.
//! - **Client credentials**: custom store apps authenticate with
//!   [`client_credentials`] alone.
//! - **Refresh and migration**: expiring offline tokens rotate through
//!   [`refresh_token`]; legacy non-expiring tokens move over once with
//!   [`migrate_to_expiring_token`].
//!
//! The redirect flow is cookie-based. [`begin_auth`] plants a signed state
//! cookie and answers with a redirect to the authorization screen;
//! [`validate_auth_callback`] checks the cookie, the query HMAC, and the
//! state before exchanging the code. [`SignedCookieJar`] does the cookie
//! signing and verification, [`validate_hmac`] the query signature, and
//! [`JwtPayload`] the session token validation.
//!
//! All token grants POST to `https://{shop}/admin/oauth/access_token`. A
//! non-2xx answer is surfaced as [`HttpResponseError`] with the status,
//! body, and headers intact; nothing is retried.
//!
//! # Example: redirect flow
//!
//! ```rust,no_run
//! use shopify_app_auth::auth::oauth::{begin_auth, validate_auth_callback, AuthRequest};
//! use shopify_app_auth::Config;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::builder()
//!     .api_key("api-key")
//!     .api_secret_key("api-secret")
//!     .host_url("https://my-app.example.com")
//!     .scopes("read_products")
//!     .build()?;
//!
//! // Install request comes in: redirect the merchant to the grant screen.
//! let request = AuthRequest::new().user_agent("Mozilla/5.0");
//! let response = begin_auth(&config, "my-shop", "/auth/callback", false, &request)?;
//! // Send response.status, response.headers back through your framework.
//!
//! // The merchant approves and the callback arrives.
//! let callback = AuthRequest::new()
//!     .user_agent("Mozilla/5.0")
//!     .cookie_header("shopify_app_state=...; shopify_app_state.sig=...")
//!     .query_param("code", "grant-code")
//!     .query_param("shop", "my-shop.myshopify.com")
//!     .query_param("state", "...")
//!     .query_param("hmac", "...")
//!     .query_param("timestamp", "1700000000");
//! let result = validate_auth_callback(&config, &callback).await?;
//! println!("authenticated {}", result.session.shop.as_ref());
//! # Ok(())
//! # }
//! ```

mod auth_query;
mod begin_auth;
mod bot;
mod client_credentials;
mod cookies;
mod error;
pub mod hmac;
mod jwt_payload;
mod request;
mod state;
mod token_exchange;
mod token_refresh;
mod validate_callback;

pub use auth_query::AuthQuery;
pub use begin_auth::begin_auth;
pub use bot::is_bot_user_agent;
pub use client_credentials::client_credentials;
pub use cookies::{SignedCookieJar, SESSION_COOKIE_NAME, STATE_COOKIE_NAME};
pub use error::{HttpResponseError, OAuthError};
pub use hmac::validate_hmac;
pub use jwt_payload::JwtPayload;
pub use request::{AuthRequest, AuthResponse};
pub use state::StateParam;
pub use token_exchange::{
    exchange_offline_token, exchange_online_token, migrate_to_expiring_token, token_exchange,
    RequestedTokenType,
};
pub use token_refresh::refresh_token;
pub use validate_callback::{validate_auth_callback, CallbackResult};

use crate::auth::session::AccessTokenResponse;
use serde::Deserialize;

/// Error body the token endpoint sends for a rejected subject token.
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    #[serde(default)]
    error: Option<String>,
}

/// Turns a token endpoint response into an [`AccessTokenResponse`].
///
/// A 400 naming `invalid_subject_token` means the endpoint rejected the
/// exchanged token itself, which callers treat the same as a locally
/// invalid one. Every other non-2xx is passed through untouched.
async fn read_token_response(
    response: reqwest::Response,
) -> Result<AccessTokenResponse, OAuthError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let headers = response
        .headers()
        .iter()
        .map(|(k, v)| {
            (
                k.as_str().to_string(),
                v.to_str().unwrap_or_default().to_string(),
            )
        })
        .collect();
    let body = response.text().await.unwrap_or_default();
    tracing::warn!(status = status.as_u16(), "token endpoint rejected the grant");

    if status.as_u16() == 400 {
        let parsed: Result<TokenErrorResponse, _> = serde_json::from_str(&body);
        if let Ok(TokenErrorResponse { error: Some(code) }) = parsed {
            if code == "invalid_subject_token" {
                return Err(OAuthError::InvalidJwt {
                    reason: "Session token was rejected by the token endpoint".to_string(),
                });
            }
        }
    }

    Err(OAuthError::Response(HttpResponseError {
        code: status.as_u16(),
        body,
        headers,
    }))
}

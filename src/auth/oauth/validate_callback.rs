//! Authorization callback validation and the code-for-token exchange.
//!
//! After the merchant approves the app, the platform redirects them to the
//! app's callback URL. This module validates that redirect end to end and
//! exchanges the authorization code for an access token.
//!
//! # Validation order
//!
//! Checks fail fast, cheapest and most suspicious first: bot user agent,
//! signed state cookie, query HMAC, then state equality. Only after all
//! four pass does any network traffic happen.

use crate::auth::oauth::bot::is_bot_user_agent;
use crate::auth::oauth::cookies::{SignedCookieJar, SESSION_COOKIE_NAME, STATE_COOKIE_NAME};
use crate::auth::oauth::error::OAuthError;
use crate::auth::oauth::hmac::{constant_time_compare, validate_hmac};
use crate::auth::oauth::request::AuthRequest;
use crate::auth::oauth::{read_token_response, AuthQuery};
use crate::auth::session::AccessTokenResponse;
use crate::auth::Session;
use crate::config::{Config, ShopDomain};

/// Request body for the authorization-code grant.
#[derive(serde::Serialize)]
struct AccessTokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
}

/// A validated callback: the new session plus response headers to send.
///
/// The headers expire the state cookie and, for non-embedded apps, set the
/// signed session cookie.
#[derive(Clone, Debug)]
pub struct CallbackResult {
    /// The session created from the token response.
    pub session: Session,

    /// Headers the adapter must attach to its response.
    pub headers: Vec<(String, String)>,
}

/// Validates an authorization callback and exchanges the code for a token.
///
/// Requires a completed [`begin_auth`](crate::auth::oauth::begin_auth): the
/// signed state cookie written there must arrive with this request.
///
/// # Cookie policy
///
/// The state cookie is expired in the returned headers either way. For
/// non-embedded apps the session id is additionally written to a signed
/// `shopify_app_session` cookie whose expiry mirrors the session's.
/// Embedded apps get no session cookie; they authenticate with session
/// tokens instead.
///
/// # Errors
///
/// - [`OAuthError::BotActivityDetected`] for bot user agents.
/// - [`OAuthError::CookieNotFound`] when the state cookie is absent.
/// - [`OAuthError::InvalidOAuth`] for a tampered cookie, an HMAC mismatch,
///   or a state mismatch.
/// - [`OAuthError::InvalidShop`] when the `shop` parameter is not a tenant
///   domain.
/// - [`OAuthError::Response`] when the token endpoint answers non-2xx. The
///   status, body, and headers are attached verbatim; nothing is retried.
/// - [`OAuthError::Http`] when the request itself fails.
pub async fn validate_auth_callback(
    config: &Config,
    request: &AuthRequest,
) -> Result<CallbackResult, OAuthError> {
    if is_bot_user_agent(request.user_agent.as_deref()) {
        return Err(OAuthError::BotActivityDetected);
    }

    let mut jar = SignedCookieJar::from_header(request.cookie_header.as_deref(), config);
    if jar.get(STATE_COOKIE_NAME).is_none() {
        return Err(OAuthError::CookieNotFound {
            cookie: STATE_COOKIE_NAME.to_string(),
        });
    }
    let Some(expected_state) = jar.get_and_verify(STATE_COOKIE_NAME) else {
        return Err(OAuthError::InvalidOAuth {
            reason: "state cookie signature did not verify".to_string(),
        });
    };

    let query = AuthQuery::from_params(request.query.clone());
    if !validate_hmac(&query, config) {
        return Err(OAuthError::InvalidOAuth {
            reason: "HMAC signature did not match query parameters".to_string(),
        });
    }

    let received_state = query.state().unwrap_or_default();
    if !constant_time_compare(received_state, &expected_state) {
        return Err(OAuthError::InvalidOAuth {
            reason: "state parameter did not match the stored nonce".to_string(),
        });
    }

    let shop = ShopDomain::new(query.shop().unwrap_or_default())?;
    let code = query.code().ok_or_else(|| OAuthError::InvalidOAuth {
        reason: "callback is missing the authorization code".to_string(),
    })?;

    let token_response = exchange_code(config, &shop, code).await?;
    let session = Session::from_access_token_response(shop, received_state, &token_response);
    tracing::debug!(session_id = session.id.as_str(), "authorization callback accepted");

    jar.delete(STATE_COOKIE_NAME);
    if !config.is_embedded() {
        jar.set_and_sign(SESSION_COOKIE_NAME, &session.id, session.expires);
    }

    let headers = jar
        .to_set_cookie_headers()
        .into_iter()
        .map(|cookie| ("Set-Cookie".to_string(), cookie))
        .collect();

    Ok(CallbackResult { session, headers })
}

async fn exchange_code(
    config: &Config,
    shop: &ShopDomain,
    code: &str,
) -> Result<AccessTokenResponse, OAuthError> {
    let token_url = format!("https://{}/admin/oauth/access_token", shop.as_ref());

    let body = AccessTokenRequest {
        client_id: config.api_key().as_ref(),
        client_secret: config.api_secret_key().as_ref(),
        code,
    };

    let client = reqwest::Client::new();
    let response = client.post(&token_url).json(&body).send().await?;
    read_token_response(response).await
}

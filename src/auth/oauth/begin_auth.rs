//! Starting the OAuth authorization code flow.
//!
//! `begin_auth` issues a CSRF nonce, signs it into the state cookie, and
//! redirects the merchant to the shop's authorization page. The callback
//! handler later requires the nonce from the cookie to match the `state`
//! query parameter.

use crate::auth::oauth::bot::is_bot_user_agent;
use crate::auth::oauth::cookies::{SignedCookieJar, STATE_COOKIE_NAME};
use crate::auth::oauth::error::OAuthError;
use crate::auth::oauth::request::{AuthRequest, AuthResponse};
use crate::auth::oauth::state::StateParam;
use crate::config::{Config, ShopDomain};
use chrono::{Duration, Utc};

/// How long the state cookie stays valid.
///
/// The merchant bounces straight to the authorization page and back, so the
/// nonce only needs to survive one redirect round trip.
const STATE_COOKIE_TTL_SECS: i64 = 60;

/// Starts an authorization code grant for `shop`.
///
/// Returns a 302 redirect to `https://{shop}/admin/oauth/authorize` with the
/// signed state cookie attached. `callback_path` is the path on the app's
/// host that will receive the callback.
///
/// # Errors
///
/// - [`OAuthError::PrivateApp`] when the app is a custom store app; those
///   authenticate with client credentials instead.
/// - [`OAuthError::BotActivityDetected`] for bot user agents. No nonce is
///   issued; adapters should answer 410.
/// - [`OAuthError::InvalidShop`] when `shop` is not a tenant domain.
/// - [`OAuthError::MissingHostConfig`] when no host URL is configured.
///
/// # Example
///
/// ```rust
/// use shopify_app_auth::auth::oauth::{begin_auth, AuthRequest};
/// use shopify_app_auth::Config;
///
/// let config = Config::builder()
///     .api_key("api-key")
///     .api_secret_key("secret")
///     .scopes("read_products")
///     .host_url("https://myapp.example.com")
///     .build()
///     .unwrap();
///
/// let request = AuthRequest::new().user_agent("Mozilla/5.0");
/// let response = begin_auth(&config, "test-shop", "/auth/callback", false, &request).unwrap();
///
/// assert_eq!(response.status, 302);
/// assert!(response.location().unwrap().starts_with(
///     "https://test-shop.myshopify.com/admin/oauth/authorize?"
/// ));
/// ```
pub fn begin_auth(
    config: &Config,
    shop: &str,
    callback_path: &str,
    is_online: bool,
    request: &AuthRequest,
) -> Result<AuthResponse, OAuthError> {
    if config.is_custom_store_app() {
        return Err(OAuthError::PrivateApp);
    }
    if is_bot_user_agent(request.user_agent.as_deref()) {
        return Err(OAuthError::BotActivityDetected);
    }

    let shop = ShopDomain::new(shop)?;
    let host = config.host_url().ok_or(OAuthError::MissingHostConfig)?;
    tracing::debug!(shop = shop.as_ref(), is_online, "starting authorization redirect");

    let state = StateParam::generate();
    let mut jar = SignedCookieJar::from_header(request.cookie_header.as_deref(), config);
    jar.set_and_sign(
        STATE_COOKIE_NAME,
        state.as_ref(),
        Some(Utc::now() + Duration::seconds(STATE_COOKIE_TTL_SECS)),
    );

    let scope = config.scopes().map(ToString::to_string).unwrap_or_default();
    let redirect_uri = format!("{}{callback_path}", host.as_ref());
    let grant_options = if is_online { "per-user" } else { "" };

    let params = [
        ("client_id", config.api_key().as_ref()),
        ("scope", scope.as_str()),
        ("redirect_uri", redirect_uri.as_str()),
        ("state", state.as_ref()),
        ("grant_options[]", grant_options),
    ];

    let query_string = params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    let auth_url = format!(
        "https://{}/admin/oauth/authorize?{query_string}",
        shop.as_ref()
    );

    Ok(AuthResponse::redirect(auth_url, jar.to_set_cookie_headers()))
}

//! Client credentials grant for custom store apps.
//!
//! Custom store apps are installed on a single shop and never go through
//! the browser authorization flow. They authenticate directly with their
//! API key and secret and receive an offline access token.

use crate::auth::oauth::{read_token_response, OAuthError};
use crate::auth::Session;
use crate::config::{Config, ShopDomain};
use serde::Serialize;

const CLIENT_CREDENTIALS_GRANT_TYPE: &str = "client_credentials";

/// Request body for the client credentials grant.
#[derive(Debug, Serialize)]
struct ClientCredentialsRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    grant_type: &'a str,
}

/// Obtains an offline access token using only the app's credentials.
///
/// No user, cookie, or session token is involved; the app's API key and
/// secret are the whole proof of identity. The returned session is always
/// offline.
///
/// # Errors
///
/// - [`OAuthError::InvalidShop`] when `shop` is not a tenant domain.
/// - [`OAuthError::Response`] when the endpoint rejects the credentials.
/// - [`OAuthError::Http`] when the request itself fails.
///
/// # Example
///
/// ```rust,no_run
/// use shopify_app_auth::auth::oauth::client_credentials;
/// use shopify_app_auth::Config;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config::builder()
///     .api_key("api-key")
///     .api_secret_key("api-secret")
///     .is_custom_store_app(true)
///     .build()?;
///
/// let session = client_credentials(&config, "my-shop").await?;
/// assert!(!session.is_online());
/// # Ok(())
/// # }
/// ```
pub async fn client_credentials(config: &Config, shop: &str) -> Result<Session, OAuthError> {
    let shop = ShopDomain::new(shop)?;
    let token_url = format!("https://{}/admin/oauth/access_token", shop.as_ref());

    let body = ClientCredentialsRequest {
        client_id: config.api_key().as_ref(),
        client_secret: config.api_secret_key().as_ref(),
        grant_type: CLIENT_CREDENTIALS_GRANT_TYPE,
    };

    let client = reqwest::Client::new();
    let response = client.post(&token_url).json(&body).send().await?;

    let token_response = read_token_response(response).await?;
    Ok(Session::from_access_token_response(shop, "", &token_response))
}

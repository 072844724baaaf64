//! Refreshing expiring offline access tokens.
//!
//! Expiring offline tokens come with a refresh token. Before the access
//! token lapses, the app trades the refresh token for a fresh pair at the
//! same token endpoint the other grants use.

use crate::auth::oauth::{read_token_response, OAuthError};
use crate::auth::Session;
use crate::config::{Config, ShopDomain};
use serde::Serialize;

/// Request body for the refresh grant.
///
/// The token endpoint identifies this grant by the presence of
/// `refresh_token`; it takes no `grant_type` field.
#[derive(Debug, Serialize)]
struct RefreshTokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    refresh_token: &'a str,
}

/// Trades a refresh token for a new expiring offline access token.
///
/// The returned session carries the new access token together with the
/// next refresh token and both expiry timestamps. A rejected refresh token
/// surfaces as [`OAuthError::Response`]; the caller restarts the install
/// flow in that case.
///
/// # Errors
///
/// - [`OAuthError::InvalidShop`] when `shop` is not a tenant domain.
/// - [`OAuthError::Response`] when the endpoint rejects the refresh token.
/// - [`OAuthError::Http`] when the request itself fails.
///
/// # Example
///
/// ```rust,no_run
/// use shopify_app_auth::auth::oauth::refresh_token;
/// use shopify_app_auth::Config;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config::builder()
///     .api_key("api-key")
///     .api_secret_key("api-secret")
///     .build()?;
///
/// let session = refresh_token(&config, "my-shop", "stored-refresh-token").await?;
/// println!("new token expires at {:?}", session.expires);
/// # Ok(())
/// # }
/// ```
pub async fn refresh_token(
    config: &Config,
    shop: &str,
    refresh_token: &str,
) -> Result<Session, OAuthError> {
    let shop = ShopDomain::new(shop)?;
    let token_url = format!("https://{}/admin/oauth/access_token", shop.as_ref());

    let body = RefreshTokenRequest {
        client_id: config.api_key().as_ref(),
        client_secret: config.api_secret_key().as_ref(),
        refresh_token,
    };

    let client = reqwest::Client::new();
    let response = client.post(&token_url).json(&body).send().await?;

    let token_response = read_token_response(response).await?;
    Ok(Session::from_access_token_response(shop, "", &token_response))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::builder()
            .api_key("test-api-key")
            .api_secret_key("test-secret")
            .build()
            .unwrap()
    }

    #[test]
    fn test_request_body_has_no_grant_type() {
        let body = RefreshTokenRequest {
            client_id: "id",
            client_secret: "secret",
            refresh_token: "refresh-me",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["refresh_token"], "refresh-me");
        assert!(json.get("grant_type").is_none());
    }

    #[tokio::test]
    async fn test_invalid_shop_fails_before_network() {
        let result = refresh_token(&config(), "not a shop.example.com", "token").await;
        assert!(matches!(result, Err(OAuthError::InvalidShop(_))));
    }

    #[tokio::test]
    async fn test_admin_url_alias_is_canonicalized() {
        // The alias resolves to the real platform domain, so the request
        // reaches the network layer instead of failing shop validation.
        let result = refresh_token(
            &config(),
            "https://admin.shopify.com/store/my-shop",
            "token",
        )
        .await;
        assert!(matches!(
            result,
            Err(OAuthError::Http(_) | OAuthError::Response(_))
        ));
    }
}

//! OAuth-specific error types.
//!
//! Covers every failure mode across the grant flows, from callback
//! validation to token endpoint responses.
//!
//! # Example
//!
//! ```rust
//! use shopify_app_auth::auth::oauth::OAuthError;
//!
//! let error = OAuthError::BotActivityDetected;
//! assert_eq!(error.suggested_status(), 410);
//! ```

use crate::error::ConfigError;
use thiserror::Error;

/// A non-2xx response from the token endpoint.
///
/// The response is surfaced as-is. The caller decides whether to retry or
/// restart the flow; the library never retries.
#[derive(Debug, Error)]
#[error("token endpoint responded with status {code}: {body}")]
pub struct HttpResponseError {
    /// The HTTP status code returned.
    pub code: u16,
    /// The raw response body.
    pub body: String,
    /// The response headers.
    pub headers: Vec<(String, String)>,
}

/// Errors that can occur during OAuth operations.
///
/// # Thread Safety
///
/// `OAuthError` is `Send + Sync`, making it safe to use across async boundaries.
#[derive(Debug, Error)]
pub enum OAuthError {
    /// The shop input failed domain validation.
    #[error(transparent)]
    InvalidShop(#[from] ConfigError),

    /// The authorization callback failed validation.
    ///
    /// Covers HMAC mismatches, state mismatches, and tampered cookies. The
    /// reason says which check failed.
    #[error("invalid OAuth callback: {reason}")]
    InvalidOAuth {
        /// Which validation failed.
        reason: String,
    },

    /// An expected cookie was absent or could not be verified.
    ///
    /// Usually means the browser blocked cookies or the callback arrived on
    /// a different device than the one that started the flow.
    #[error("cookie '{cookie}' not found on request")]
    CookieNotFound {
        /// Name of the missing cookie.
        cookie: String,
    },

    /// A session token failed signature or claim validation.
    #[error("invalid session token: {reason}")]
    InvalidJwt {
        /// Why the token was rejected.
        reason: String,
    },

    /// The operation does not apply to custom store apps.
    ///
    /// Custom store apps authenticate with client credentials and never go
    /// through the authorization-code flow.
    #[error("custom store apps do not use the OAuth authorization flow")]
    PrivateApp,

    /// The request's user agent matched a known bot.
    #[error("bot user agent detected")]
    BotActivityDetected,

    /// Host URL is not configured.
    ///
    /// Building the authorization redirect requires a host URL to construct
    /// the redirect URI. Configure it via `ConfigBuilder::host_url()`.
    #[error("host URL must be configured for OAuth")]
    MissingHostConfig,

    /// The token endpoint returned a non-2xx response.
    #[error(transparent)]
    Response(#[from] HttpResponseError),

    /// The HTTP request itself failed.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl OAuthError {
    /// The HTTP status an adapter should answer with for this error.
    #[must_use]
    pub fn suggested_status(&self) -> u16 {
        match self {
            Self::BotActivityDetected => 410,
            Self::InvalidShop(_) | Self::InvalidOAuth { .. } | Self::CookieNotFound { .. } => 400,
            Self::InvalidJwt { .. } => 401,
            Self::Response(response) => response.code,
            _ => 500,
        }
    }
}

// Verify OAuthError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<OAuthError>();
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_oauth_includes_reason() {
        let error = OAuthError::InvalidOAuth {
            reason: "HMAC mismatch".to_string(),
        };
        assert!(error.to_string().contains("HMAC mismatch"));
    }

    #[test]
    fn test_cookie_not_found_names_the_cookie() {
        let error = OAuthError::CookieNotFound {
            cookie: "shopify_app_state".to_string(),
        };
        assert!(error.to_string().contains("shopify_app_state"));
    }

    #[test]
    fn test_response_error_includes_status_and_body() {
        let error = OAuthError::Response(HttpResponseError {
            code: 401,
            body: "invalid client".to_string(),
            headers: vec![],
        });
        let message = error.to_string();
        assert!(message.contains("401"));
        assert!(message.contains("invalid client"));
    }

    #[test]
    fn test_invalid_shop_converts_from_config_error() {
        let config_error = ConfigError::InvalidShopDomain {
            domain: "bad domain".to_string(),
        };
        let error: OAuthError = config_error.into();
        assert!(matches!(error, OAuthError::InvalidShop(_)));
        assert_eq!(error.suggested_status(), 400);
    }

    #[test]
    fn test_suggested_statuses() {
        assert_eq!(OAuthError::BotActivityDetected.suggested_status(), 410);
        assert_eq!(
            OAuthError::InvalidJwt {
                reason: String::new()
            }
            .suggested_status(),
            401
        );
        assert_eq!(OAuthError::MissingHostConfig.suggested_status(), 500);
        assert_eq!(
            OAuthError::Response(HttpResponseError {
                code: 429,
                body: String::new(),
                headers: vec![],
            })
            .suggested_status(),
            429
        );
    }

    #[test]
    fn test_implements_std_error() {
        let error: &dyn std::error::Error = &OAuthError::PrivateApp;
        let _ = error;
    }
}

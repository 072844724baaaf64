//! Configuration types for the library.
//!
//! This module provides the [`Config`] struct that holds all library-level
//! settings, along with a [`ConfigBuilder`] for ergonomic construction.
//!
//! # Example
//!
//! ```rust
//! use shopify_app_auth::Config;
//!
//! let config = Config::builder()
//!     .api_key("your-api-key")
//!     .api_secret_key("your-api-secret")
//!     .scopes("read_products,write_products")
//!     .host_url("https://your-app.example.com")
//!     .build()
//!     .expect("Failed to build config");
//! ```

mod newtypes;

pub use newtypes::{ApiKey, ApiSecretKey, HostUrl, ShopDomain};

use crate::auth::AuthScopes;
use crate::error::ConfigError;

/// Application-level configuration shared by every auth operation.
///
/// Use [`Config::builder()`] to construct it. The API key and secret key are
/// required; everything else has a sensible default.
#[derive(Clone, Debug)]
pub struct Config {
    api_key: ApiKey,
    api_secret_key: ApiSecretKey,
    old_api_secret_key: Option<ApiSecretKey>,
    scopes: Option<AuthScopes>,
    host_url: Option<HostUrl>,
    is_embedded: bool,
    is_custom_store_app: bool,
}

impl Config {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Returns the API key.
    #[must_use]
    pub fn api_key(&self) -> &ApiKey {
        &self.api_key
    }

    /// Returns the API secret key.
    #[must_use]
    pub fn api_secret_key(&self) -> &ApiSecretKey {
        &self.api_secret_key
    }

    /// Returns the previous API secret key, if one is configured.
    ///
    /// During secret rotation, signatures are verified against both the current
    /// and the previous key so in-flight requests keep working.
    #[must_use]
    pub fn old_api_secret_key(&self) -> Option<&ApiSecretKey> {
        self.old_api_secret_key.as_ref()
    }

    /// Returns the secret keys to verify signatures against, newest first.
    #[must_use]
    pub fn signing_keys(&self) -> Vec<&ApiSecretKey> {
        let mut keys = vec![&self.api_secret_key];
        if let Some(old) = &self.old_api_secret_key {
            keys.push(old);
        }
        keys
    }

    /// Returns the configured OAuth scopes, if any.
    #[must_use]
    pub fn scopes(&self) -> Option<&AuthScopes> {
        self.scopes.as_ref()
    }

    /// Returns the application host URL, if configured.
    #[must_use]
    pub fn host_url(&self) -> Option<&HostUrl> {
        self.host_url.as_ref()
    }

    /// Returns whether the app runs embedded in the Shopify Admin.
    #[must_use]
    pub fn is_embedded(&self) -> bool {
        self.is_embedded
    }

    /// Returns whether the app is a custom store app using client credentials.
    #[must_use]
    pub fn is_custom_store_app(&self) -> bool {
        self.is_custom_store_app
    }
}

/// Builder for [`Config`].
#[derive(Clone, Debug, Default)]
pub struct ConfigBuilder {
    api_key: Option<String>,
    api_secret_key: Option<String>,
    old_api_secret_key: Option<String>,
    scopes: Option<String>,
    host_url: Option<String>,
    is_embedded: Option<bool>,
    is_custom_store_app: Option<bool>,
}

impl ConfigBuilder {
    /// Creates a new empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key (required).
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the API secret key (required).
    #[must_use]
    pub fn api_secret_key(mut self, key: impl Into<String>) -> Self {
        self.api_secret_key = Some(key.into());
        self
    }

    /// Sets the previous API secret key, enabling key-rotation fallback.
    #[must_use]
    pub fn old_api_secret_key(mut self, key: impl Into<String>) -> Self {
        self.old_api_secret_key = Some(key.into());
        self
    }

    /// Sets the OAuth scopes as a comma-separated string.
    #[must_use]
    pub fn scopes(mut self, scopes: impl Into<String>) -> Self {
        self.scopes = Some(scopes.into());
        self
    }

    /// Sets the application host URL.
    #[must_use]
    pub fn host_url(mut self, url: impl Into<String>) -> Self {
        self.host_url = Some(url.into());
        self
    }

    /// Sets whether the app runs embedded in the Shopify Admin.
    ///
    /// Defaults to `true`.
    #[must_use]
    pub fn is_embedded(mut self, embedded: bool) -> Self {
        self.is_embedded = Some(embedded);
        self
    }

    /// Sets whether the app is a custom store app.
    ///
    /// Defaults to `false`.
    #[must_use]
    pub fn is_custom_store_app(mut self, custom: bool) -> Self {
        self.is_custom_store_app = Some(custom);
        self
    }

    /// Validates the settings and builds the [`Config`].
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a required field is missing or a supplied
    /// value fails validation.
    pub fn build(self) -> Result<Config, ConfigError> {
        let api_key = self
            .api_key
            .ok_or(ConfigError::MissingRequiredField { field: "api_key" })?;
        let api_secret_key = self.api_secret_key.ok_or(ConfigError::MissingRequiredField {
            field: "api_secret_key",
        })?;

        let scopes = self.scopes.map(|s| s.parse::<AuthScopes>()).transpose()?;
        let host_url = self.host_url.map(HostUrl::new).transpose()?;
        let old_api_secret_key = self.old_api_secret_key.map(ApiSecretKey::new).transpose()?;

        Ok(Config {
            api_key: ApiKey::new(api_key)?,
            api_secret_key: ApiSecretKey::new(api_secret_key)?,
            old_api_secret_key,
            scopes,
            host_url,
            is_embedded: self.is_embedded.unwrap_or(true),
            is_custom_store_app: self.is_custom_store_app.unwrap_or(false),
        })
    }
}

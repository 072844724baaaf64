//! # Shopify App Authentication
//!
//! Client-side authentication for Shopify apps: OAuth grant flows, session
//! token validation, and session persistence helpers.
//!
//! ## Overview
//!
//! This crate provides:
//! - Validated configuration via [`Config`] and its builder
//! - Newtypes for credentials and domain values ([`ApiKey`], [`ApiSecretKey`],
//!   [`ShopDomain`], [`HostUrl`])
//! - Scope handling with implied-scope normalization ([`AuthScopes`])
//! - The OAuth authorization code flow, token exchange, client credentials,
//!   and token refresh via [`auth::oauth`]
//! - Session token (JWT) validation via [`auth::oauth::JwtPayload`]
//! - [`Session`] entities with a storage trait and a property-array codec
//!   for persistence, including field-level encryption
//!
//! ## Quick Start
//!
//! ```rust
//! use shopify_app_auth::Config;
//!
//! let config = Config::builder()
//!     .api_key("your-api-key")
//!     .api_secret_key("your-api-secret")
//!     .scopes("read_products,write_orders")
//!     .host_url("https://your-app.example.com")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.api_key().as_ref(), "your-api-key");
//! ```
//!
//! ## OAuth Flows
//!
//! Standalone apps use the redirect flow:
//!
//! ```rust,ignore
//! use shopify_app_auth::auth::oauth::{begin_auth, validate_auth_callback, AuthRequest};
//!
//! // Install request: answer with a redirect to the grant screen.
//! let response = begin_auth(&config, "example-shop", "/auth/callback", false, &request)?;
//!
//! // Callback: validate and exchange the code for a session.
//! let result = validate_auth_callback(&config, &callback_request).await?;
//! let session = result.session;
//! ```
//!
//! Embedded apps exchange the session token App Bridge hands them:
//!
//! ```rust,ignore
//! use shopify_app_auth::auth::oauth::{exchange_offline_token, exchange_online_token};
//!
//! let session = exchange_online_token(&config, "example-shop", session_token).await?;
//! ```
//!
//! Custom store apps skip the browser entirely:
//!
//! ```rust,ignore
//! use shopify_app_auth::auth::oauth::client_credentials;
//!
//! let session = client_credentials(&config, "example-shop").await?;
//! ```
//!
//! ## Sessions
//!
//! Sessions are plain data and serialize for storage:
//!
//! ```rust
//! use shopify_app_auth::{Session, ShopDomain};
//!
//! let shop = ShopDomain::new("example-shop").unwrap();
//! let session = Session::offline(shop, String::new());
//! assert_eq!(session.id, "offline_example-shop.myshopify.com");
//!
//! let json = serde_json::to_string(&session).unwrap();
//! ```
//!
//! For key-value stores, the property-array codec flattens a session into
//! ordered pairs and can encrypt the sensitive ones:
//!
//! ```rust,ignore
//! use shopify_app_auth::auth::session::codec;
//!
//! let pairs = codec::to_encrypted_property_array(&session, true, &key, &fields)?;
//! let restored = codec::from_encrypted_property_array(&pairs, true, &key)?;
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: configuration is instance-based and passed explicitly
//! - **Fail-fast validation**: newtypes validate on construction
//! - **Thread-safe**: public types are `Send + Sync`
//! - **No retries**: token endpoint responses are surfaced as-is

pub mod auth;
pub mod config;
pub mod crypto;
pub mod error;

// Re-export public types at crate root for convenience
pub use auth::{
    AccessTokenKind, AssociatedUser, AuthScopes, OnlineAccessInfo, Session, SessionStorage,
    StorageError,
};
pub use config::{ApiKey, ApiSecretKey, Config, ConfigBuilder, HostUrl, ShopDomain};
pub use crypto::CryptoError;
pub use error::ConfigError;

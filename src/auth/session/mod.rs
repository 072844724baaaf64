//! Session entity and the token-response mapping that produces it.
//!
//! A [`Session`] represents one authenticated grant from a shop, either
//! app-level (offline) or tied to a staff member (online). Every grant flow
//! maps the token endpoint's JSON response onto a session through
//! [`Session::from_access_token_response`], so the id scheme and expiry
//! handling stay identical across flows.

pub mod codec;

use crate::auth::associated_user::{AssociatedUser, OnlineAccessInfo};
use crate::auth::AuthScopes;
use crate::config::ShopDomain;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// The body returned by `https://{shop}/admin/oauth/access_token`.
///
/// Online grants include `associated_user`; expiring grants include the
/// `expires_in` and refresh token fields. Everything beyond `access_token`
/// and `scope` is optional.
#[derive(Clone, Debug, Deserialize)]
pub struct AccessTokenResponse {
    /// The granted access token.
    pub access_token: String,

    /// Comma-separated scopes actually granted.
    pub scope: String,

    /// Seconds until the access token expires, when the grant is expiring.
    #[serde(default)]
    pub expires_in: Option<i64>,

    /// Scopes the associated user can act under (online grants only).
    #[serde(default)]
    pub associated_user_scope: Option<String>,

    /// The authorizing staff member (online grants only).
    #[serde(default)]
    pub associated_user: Option<AssociatedUser>,

    /// Refresh token for expiring grants.
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// Seconds until the refresh token expires.
    #[serde(default)]
    pub refresh_token_expires_in: Option<i64>,
}

/// Distinguishes app-level tokens from user-tied tokens.
///
/// Online metadata exists exactly when the token is online, so "is this
/// session online" and "does it have user info" cannot disagree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessTokenKind {
    /// App-level token, shared by everyone using the app on the shop.
    Offline,

    /// User-tied token with the authorizing user's details.
    Online(OnlineAccessInfo),
}

/// An authenticated session for a shop.
///
/// # Thread Safety
///
/// `Session` is `Send + Sync`, making it safe to share across threads.
///
/// # Example
///
/// ```rust
/// use shopify_app_auth::{Session, ShopDomain};
///
/// let shop = ShopDomain::new("my-store").unwrap();
/// let session = Session::offline(shop, "nonce".to_string());
///
/// assert_eq!(session.id, "offline_my-store.myshopify.com");
/// assert!(!session.is_online());
/// assert!(!session.expired());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier, derived from the shop and token kind.
    pub id: String,

    /// The shop this session belongs to.
    pub shop: ShopDomain,

    /// OAuth state parameter. Empty for non-interactive grants.
    pub state: String,

    /// The access token, once a grant has completed.
    pub access_token: Option<String>,

    /// Scopes granted to this session.
    pub scope: Option<AuthScopes>,

    /// When the access token expires, if it does.
    pub expires: Option<DateTime<Utc>>,

    /// Whether the token is app-level or user-tied.
    pub kind: AccessTokenKind,

    /// Refresh token, for expiring grants.
    pub refresh_token: Option<String>,

    /// When the refresh token expires.
    pub refresh_token_expires: Option<DateTime<Utc>>,
}

impl Session {
    /// Returns the deterministic id for an offline session on `shop`.
    #[must_use]
    pub fn offline_id(shop: &ShopDomain) -> String {
        format!("offline_{}", shop.as_ref())
    }

    /// Returns the deterministic id for `user_id`'s online session on `shop`.
    #[must_use]
    pub fn online_id(shop: &ShopDomain, user_id: u64) -> String {
        format!("{}_{user_id}", shop.as_ref())
    }

    /// Creates an offline session with no token yet.
    #[must_use]
    pub fn offline(shop: ShopDomain, state: String) -> Self {
        Self {
            id: Self::offline_id(&shop),
            shop,
            state,
            access_token: None,
            scope: None,
            expires: None,
            kind: AccessTokenKind::Offline,
            refresh_token: None,
            refresh_token_expires: None,
        }
    }

    /// Maps a token endpoint response onto a session.
    ///
    /// The session is online when the response carries `associated_user`,
    /// offline otherwise. Expiry instants are computed from the response's
    /// relative `expires_in` seconds against the current time.
    #[must_use]
    pub fn from_access_token_response(
        shop: ShopDomain,
        state: impl Into<String>,
        response: &AccessTokenResponse,
    ) -> Self {
        let now = Utc::now();
        let expires = response.expires_in.map(|secs| now + Duration::seconds(secs));
        let refresh_token_expires = response
            .refresh_token_expires_in
            .map(|secs| now + Duration::seconds(secs));

        let (id, kind) = match &response.associated_user {
            Some(user) => (
                Self::online_id(&shop, user.id),
                AccessTokenKind::Online(OnlineAccessInfo {
                    expires_in: response.expires_in,
                    associated_user_scope: response.associated_user_scope.clone(),
                    associated_user: user.clone(),
                }),
            ),
            None => (Self::offline_id(&shop), AccessTokenKind::Offline),
        };

        Self {
            id,
            shop,
            state: state.into(),
            access_token: Some(response.access_token.clone()),
            scope: response.scope.parse().ok(),
            expires,
            kind,
            refresh_token: response.refresh_token.clone(),
            refresh_token_expires,
        }
    }

    /// Returns `true` if the token is tied to a user.
    #[must_use]
    pub fn is_online(&self) -> bool {
        matches!(self.kind, AccessTokenKind::Online(_))
    }

    /// Returns the online token metadata, if this session is online.
    #[must_use]
    pub fn online_access_info(&self) -> Option<&OnlineAccessInfo> {
        match &self.kind {
            AccessTokenKind::Online(info) => Some(info),
            AccessTokenKind::Offline => None,
        }
    }

    /// Returns the associated user, if this session is online.
    #[must_use]
    pub fn associated_user(&self) -> Option<&AssociatedUser> {
        self.online_access_info().map(|info| &info.associated_user)
    }

    /// Returns `true` if the access token has expired.
    ///
    /// Sessions without an expiry never expire.
    #[must_use]
    pub fn expired(&self) -> bool {
        self.expires_within(Duration::zero())
    }

    /// Returns `true` if the access token expires within `lead` from now.
    ///
    /// Useful for refreshing a token slightly before it actually lapses.
    #[must_use]
    pub fn expires_within(&self, lead: Duration) -> bool {
        self.expires
            .is_some_and(|expires| Utc::now() + lead > expires)
    }

    /// Returns `true` if the refresh token has expired.
    #[must_use]
    pub fn refresh_token_expired(&self) -> bool {
        self.refresh_token_expires
            .is_some_and(|expires| Utc::now() > expires)
    }

    /// Returns `true` if the session holds an unexpired token covering
    /// `required_scopes` (when given).
    #[must_use]
    pub fn is_active(&self, required_scopes: Option<&AuthScopes>) -> bool {
        let has_token = self
            .access_token
            .as_ref()
            .is_some_and(|token| !token.is_empty());

        let scopes_ok = required_scopes.map_or(true, |required| {
            self.scope
                .as_ref()
                .is_some_and(|granted| granted.covers(required))
        });

        has_token && !self.expired() && scopes_ok
    }

    /// Replaces the access token.
    pub fn set_access_token(&mut self, token: impl Into<String>) {
        self.access_token = Some(token.into());
    }
}

// Verify Session is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Session>();
    assert_send_sync::<AccessTokenResponse>();
};

#[cfg(test)]
mod tests {
    use super::*;

    fn shop() -> ShopDomain {
        ShopDomain::new("test-shop").unwrap()
    }

    fn offline_response() -> AccessTokenResponse {
        AccessTokenResponse {
            access_token: "offline-token".to_string(),
            scope: "read_products,write_orders".to_string(),
            expires_in: None,
            associated_user_scope: None,
            associated_user: None,
            refresh_token: None,
            refresh_token_expires_in: None,
        }
    }

    fn online_response() -> AccessTokenResponse {
        AccessTokenResponse {
            access_token: "online-token".to_string(),
            scope: "read_products".to_string(),
            expires_in: Some(86400),
            associated_user_scope: Some("read_products".to_string()),
            associated_user: Some(AssociatedUser {
                id: 90210,
                first_name: "Jane".to_string(),
                email: "jane@example.com".to_string(),
                ..AssociatedUser::default()
            }),
            refresh_token: None,
            refresh_token_expires_in: None,
        }
    }

    #[test]
    fn test_offline_response_produces_offline_session() {
        let session = Session::from_access_token_response(shop(), "state-123", &offline_response());

        assert_eq!(session.id, "offline_test-shop.myshopify.com");
        assert!(!session.is_online());
        assert!(session.online_access_info().is_none());
        assert_eq!(session.access_token.as_deref(), Some("offline-token"));
        assert!(session.expires.is_none());
        assert_eq!(session.state, "state-123");
    }

    #[test]
    fn test_online_response_produces_online_session() {
        let session = Session::from_access_token_response(shop(), "state-123", &online_response());

        assert_eq!(session.id, "test-shop.myshopify.com_90210");
        assert!(session.is_online());

        let info = session.online_access_info().unwrap();
        assert_eq!(info.associated_user.id, 90210);
        assert_eq!(info.expires_in, Some(86400));

        let expires = session.expires.unwrap();
        assert!(expires > Utc::now() + Duration::seconds(86300));
        assert!(expires < Utc::now() + Duration::seconds(86500));
    }

    #[test]
    fn test_expiring_offline_response_sets_refresh_fields() {
        let mut response = offline_response();
        response.expires_in = Some(86400);
        response.refresh_token = Some("refresh-me".to_string());
        response.refresh_token_expires_in = Some(2_592_000);

        let session = Session::from_access_token_response(shop(), "", &response);
        assert!(!session.is_online());
        assert_eq!(session.refresh_token.as_deref(), Some("refresh-me"));
        assert!(!session.refresh_token_expired());

        let refresh_expires = session.refresh_token_expires.unwrap();
        let expected = Utc::now() + Duration::seconds(2_592_000);
        assert!((refresh_expires - expected).num_seconds().abs() <= 1);
    }

    #[test]
    fn test_expired_and_expires_within() {
        let mut session = Session::offline(shop(), String::new());
        assert!(!session.expired());

        session.expires = Some(Utc::now() + Duration::minutes(5));
        assert!(!session.expired());
        assert!(session.expires_within(Duration::minutes(10)));

        session.expires = Some(Utc::now() - Duration::minutes(5));
        assert!(session.expired());
    }

    #[test]
    fn test_is_active_checks_token_expiry_and_scopes() {
        let mut session = Session::from_access_token_response(shop(), "", &offline_response());
        assert!(session.is_active(None));

        let required: AuthScopes = "read_products".parse().unwrap();
        assert!(session.is_active(Some(&required)));

        let too_many: AuthScopes = "read_customers".parse().unwrap();
        assert!(!session.is_active(Some(&too_many)));

        session.expires = Some(Utc::now() - Duration::hours(1));
        assert!(!session.is_active(None));

        let bare = Session::offline(shop(), String::new());
        assert!(!bare.is_active(None));
    }

    #[test]
    fn test_ids_are_deterministic() {
        assert_eq!(
            Session::offline_id(&shop()),
            "offline_test-shop.myshopify.com"
        );
        assert_eq!(
            Session::online_id(&shop(), 42),
            "test-shop.myshopify.com_42"
        );
    }
}

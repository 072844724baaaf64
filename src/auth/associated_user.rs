//! User details attached to online sessions.
//!
//! Online access tokens are tied to the staff member who authorized the app.
//! The token response carries their details, which are kept on the session as
//! an [`AssociatedUser`].

use serde::{Deserialize, Serialize};

/// The Shopify staff member who authorized an online access token.
///
/// # Example
///
/// ```rust
/// use shopify_app_auth::AssociatedUser;
///
/// let user = AssociatedUser {
///     id: 12345,
///     first_name: "Jane".to_string(),
///     email: "jane@example.com".to_string(),
///     account_owner: true,
///     ..AssociatedUser::default()
/// };
///
/// let json = serde_json::to_string(&user).unwrap();
/// let restored: AssociatedUser = serde_json::from_str(&json).unwrap();
/// assert_eq!(user, restored);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociatedUser {
    /// The numeric Shopify user ID.
    pub id: u64,

    /// The user's first name.
    #[serde(default)]
    pub first_name: String,

    /// The user's last name.
    #[serde(default)]
    pub last_name: String,

    /// The user's email address.
    #[serde(default)]
    pub email: String,

    /// Whether the email address has been verified.
    #[serde(default)]
    pub email_verified: bool,

    /// Whether the user owns the store's account.
    #[serde(default)]
    pub account_owner: bool,

    /// The user's locale, e.g. "en" or "fr".
    #[serde(default)]
    pub locale: String,

    /// Whether the user is a collaborator rather than a staff member.
    #[serde(default)]
    pub collaborator: bool,
}

impl AssociatedUser {
    /// Creates a user record holding only the numeric ID.
    ///
    /// Used when reconstructing a session from a serialized form that kept
    /// just the user ID and dropped the remaining details.
    #[must_use]
    pub fn from_id(id: u64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }
}

/// Metadata carried by online access tokens alongside the token itself.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnlineAccessInfo {
    /// Seconds until the online token expires, as reported by the platform.
    pub expires_in: Option<i64>,

    /// The subset of the app's scopes the user can act under.
    pub associated_user_scope: Option<String>,

    /// The staff member the token is tied to.
    pub associated_user: AssociatedUser,
}

// Verify AssociatedUser is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AssociatedUser>();
    assert_send_sync::<OnlineAccessInfo>();
};

//! Callback query parameters and the message signed by the platform.

/// The query string of an authorization callback, as received.
///
/// Keeps every parameter, known or not, because the HMAC covers all of them.
///
/// # Example
///
/// ```rust
/// use shopify_app_auth::auth::oauth::AuthQuery;
///
/// let query = AuthQuery::from_params(vec![
///     ("state".to_string(), "xyz".to_string()),
///     ("hmac".to_string(), "abcd".to_string()),
///     ("code".to_string(), "auth-code".to_string()),
/// ]);
///
/// // hmac is excluded and keys are sorted
/// assert_eq!(query.to_signable_string(), "code=auth-code&state=xyz");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthQuery {
    params: Vec<(String, String)>,
}

impl AuthQuery {
    /// Wraps the decoded query parameters of a callback request.
    #[must_use]
    pub fn from_params(params: Vec<(String, String)>) -> Self {
        Self { params }
    }

    /// Returns the first value for `key`, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The `hmac` parameter.
    #[must_use]
    pub fn hmac(&self) -> Option<&str> {
        self.get("hmac")
    }

    /// The authorization `code` parameter.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.get("code")
    }

    /// The `shop` parameter.
    #[must_use]
    pub fn shop(&self) -> Option<&str> {
        self.get("shop")
    }

    /// The `state` parameter.
    #[must_use]
    pub fn state(&self) -> Option<&str> {
        self.get("state")
    }

    /// Builds the message the platform signed.
    ///
    /// Every parameter except `hmac` and `signature`, sorted by key,
    /// rendered as `key=value` and joined with `&`.
    #[must_use]
    pub fn to_signable_string(&self) -> String {
        let mut pairs: Vec<&(String, String)> = self
            .params
            .iter()
            .filter(|(k, _)| k != "hmac" && k != "signature")
            .collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));

        pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}

//! Framework-neutral request and response shapes for the OAuth handlers.
//!
//! The begin and callback handlers never touch a web framework. Adapters
//! populate an [`AuthRequest`] from whatever server they run in and apply
//! the returned [`AuthResponse`] to their own response type.

/// The parts of an incoming HTTP request the OAuth handlers look at.
#[derive(Clone, Debug, Default)]
pub struct AuthRequest {
    /// The `User-Agent` header, if present.
    pub user_agent: Option<String>,

    /// The raw `Cookie` header, if present.
    pub cookie_header: Option<String>,

    /// Decoded query parameters, in received order.
    pub query: Vec<(String, String)>,
}

impl AuthRequest {
    /// Creates an empty request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the `User-Agent` header.
    #[must_use]
    pub fn user_agent(mut self, value: impl Into<String>) -> Self {
        self.user_agent = Some(value.into());
        self
    }

    /// Sets the `Cookie` header.
    #[must_use]
    pub fn cookie_header(mut self, value: impl Into<String>) -> Self {
        self.cookie_header = Some(value.into());
        self
    }

    /// Adds a decoded query parameter.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

/// The HTTP response an adapter should send back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthResponse {
    /// HTTP status code.
    pub status: u16,

    /// Headers to set. `Set-Cookie` may appear multiple times.
    pub headers: Vec<(String, String)>,
}

impl AuthResponse {
    /// Builds a 302 redirect to `location` with the given cookie headers.
    #[must_use]
    pub fn redirect(location: impl Into<String>, set_cookies: Vec<String>) -> Self {
        let mut headers = vec![("Location".to_string(), location.into())];
        headers.extend(
            set_cookies
                .into_iter()
                .map(|cookie| ("Set-Cookie".to_string(), cookie)),
        );
        Self {
            status: 302,
            headers,
        }
    }

    /// Returns the `Location` header, if set.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.header("Location")
    }

    /// Returns the first header named `name`, if any.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns every `Set-Cookie` header value.
    #[must_use]
    pub fn set_cookies(&self) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case("Set-Cookie"))
            .map(|(_, v)| v.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = AuthRequest::new()
            .user_agent("Mozilla/5.0")
            .cookie_header("a=1")
            .query_param("shop", "test-shop.myshopify.com");

        assert_eq!(request.user_agent.as_deref(), Some("Mozilla/5.0"));
        assert_eq!(request.cookie_header.as_deref(), Some("a=1"));
        assert_eq!(request.query.len(), 1);
    }

    #[test]
    fn test_redirect_response() {
        let response = AuthResponse::redirect(
            "https://x.myshopify.com/admin/oauth/authorize",
            vec!["state=abc; Path=/".to_string()],
        );

        assert_eq!(response.status, 302);
        assert_eq!(
            response.location(),
            Some("https://x.myshopify.com/admin/oauth/authorize")
        );
        assert_eq!(response.set_cookies(), vec!["state=abc; Path=/"]);
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let response = AuthResponse::redirect("https://example.com", vec![]);
        assert_eq!(response.header("location"), Some("https://example.com"));
    }
}

//! CSRF nonce for the authorization flow.

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Length of generated nonces.
const NONCE_LENGTH: usize = 15;

/// A random state parameter tying a callback to the request that started it.
///
/// The nonce rides in the authorization URL and in a signed cookie; the
/// callback is only accepted when the two agree.
///
/// # Example
///
/// ```rust
/// use shopify_app_auth::auth::oauth::StateParam;
///
/// let state = StateParam::generate();
/// assert_eq!(state.as_ref().len(), 15);
/// assert!(state.as_ref().chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateParam(String);

impl StateParam {
    /// Generates a fresh random nonce.
    #[must_use]
    pub fn generate() -> Self {
        let nonce: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(NONCE_LENGTH)
            .map(char::from)
            .collect();
        Self(nonce)
    }

    /// Consumes the state, returning the nonce string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for StateParam {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_produces_15_alphanumeric_chars() {
        let state = StateParam::generate();
        assert_eq!(state.as_ref().len(), NONCE_LENGTH);
        assert!(state.as_ref().chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generate_produces_unique_values() {
        let a = StateParam::generate();
        let b = StateParam::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_into_inner() {
        let state = StateParam::generate();
        let nonce = state.clone().into_inner();
        assert_eq!(nonce, state.as_ref());
    }
}

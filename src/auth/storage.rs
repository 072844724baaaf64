//! Storage contract for persisting sessions.
//!
//! The library never persists sessions itself. Applications implement
//! [`SessionStorage`] over whatever backend they use and hand it to the
//! pieces that need to load or save sessions.

use crate::auth::session::Session;
use async_trait::async_trait;
use thiserror::Error;

/// Error surfaced by a storage backend.
///
/// Backends wrap their own failures in the message; the library only needs
/// to know the operation did not complete.
#[derive(Debug, Error)]
#[error("session storage error: {message}")]
pub struct StorageError {
    message: String,
}

impl StorageError {
    /// Creates a storage error from a backend-specific message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Backend-agnostic persistence for [`Session`]s.
///
/// Implementations must be `Send + Sync`; the trait is consumed from async
/// contexts that may move across threads.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Loads a session by id. `Ok(None)` means the id is unknown.
    async fn load_session(&self, id: &str) -> Result<Option<Session>, StorageError>;

    /// Stores a session, replacing any existing session with the same id.
    async fn store_session(&self, session: &Session) -> Result<(), StorageError>;

    /// Deletes a session by id. Deleting an unknown id is not an error.
    async fn delete_session(&self, id: &str) -> Result<(), StorageError>;

    /// Deletes several sessions at once.
    async fn delete_sessions(&self, ids: &[String]) -> Result<(), StorageError> {
        for id in ids {
            self.delete_session(id).await?;
        }
        Ok(())
    }

    /// Returns every stored session for `shop`.
    async fn find_sessions_by_shop(&self, shop: &str) -> Result<Vec<Session>, StorageError>;
}

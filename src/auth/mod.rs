//! Authentication: sessions, scopes, OAuth flows, and storage.

pub mod associated_user;
pub mod oauth;
pub mod scopes;
pub mod session;
pub mod storage;

pub use associated_user::{AssociatedUser, OnlineAccessInfo};
pub use scopes::AuthScopes;
pub use session::{AccessTokenKind, AccessTokenResponse, Session};
pub use storage::{SessionStorage, StorageError};

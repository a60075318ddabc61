//! Driving port for authentication.
//!
//! Inbound adapters call it to turn a login form or a bearer token into a
//! principal without knowing how users are stored or passwords are checked.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, User};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Check a username/password pair; any mismatch is `403`.
    async fn login(&self, credentials: &LoginCredentials) -> Result<User, Error>;

    /// Resolve a raw credential header value to its user.
    ///
    /// The value is trimmed; blank yields "Missing access token." and an
    /// unknown token "Token invalid.", both `403`.
    async fn authenticate(&self, token: &str) -> Result<User, Error>;
}

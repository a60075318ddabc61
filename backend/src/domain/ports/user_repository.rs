//! Port abstraction for user account persistence and its errors.
use async_trait::async_trait;

use crate::domain::{Email, NewUser, User, UserId, Username};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// A unique constraint on `field` rejected the write.
        Duplicate { field: String } => "a user with the same {field} already exists",
        /// The user disappeared before the write.
        NotFound { id: i64 } => "user {id} not found",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserRepositoryError>;

    /// Fetch a user by login name.
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserRepositoryError>;

    /// Fetch the user holding exactly this bearer token.
    async fn find_by_token(&self, token: &str) -> Result<Option<User>, UserRepositoryError>;

    /// Whether any user already uses `email`.
    async fn email_exists(&self, email: &Email) -> Result<bool, UserRepositoryError>;

    /// Whether any user already uses `username`.
    async fn username_exists(&self, username: &Username) -> Result<bool, UserRepositoryError>;

    /// Insert a user and return it with its assigned identifier.
    async fn create(&self, user: &NewUser) -> Result<User, UserRepositoryError>;

    /// Persist profile and password digest; `id` and `token` are never written.
    async fn update(&self, user: &User) -> Result<(), UserRepositoryError>;

    /// Remove a user.
    async fn delete(&self, id: UserId) -> Result<(), UserRepositoryError>;
}

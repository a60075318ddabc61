//! Driving port for account management.

use async_trait::async_trait;

use crate::domain::{Error, User, UserDraft, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserAdmin: Send + Sync {
    /// Create an account; admin only. The draft must carry a password.
    async fn create_user(&self, principal: &User, draft: UserDraft) -> Result<User, Error>;

    /// One account, `404` when missing, `403` unless self or admin.
    async fn get_user(&self, principal: &User, id: UserId) -> Result<User, Error>;

    /// Update an account; `id` and `token` are kept.
    async fn update_user(
        &self,
        principal: &User,
        id: UserId,
        draft: UserDraft,
    ) -> Result<User, Error>;

    /// Delete an account.
    async fn delete_user(&self, principal: &User, id: UserId) -> Result<(), Error>;
}

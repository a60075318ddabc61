//! Account coordinator and credential resolution.
//!
//! Implements [`UserAdmin`] and [`LoginService`] over the user repository,
//! the password hasher and the token generator.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::authorization::{can_access_user, can_create_user, normalize_admin_flag};
use crate::domain::ports::{
    LoginService, PasswordHashError, PasswordHasher, TokenGenerator, UserAdmin, UserRepository,
    UserRepositoryError,
};
use crate::domain::{
    Error, INVALID_TOKEN_MESSAGE, LoginCredentials, MISSING_TOKEN_MESSAGE, NewUser, PasswordHash,
    User, UserDraft, UserId, Username, auth::credentials_mismatch,
};

pub(crate) const USER_NOT_FOUND_MESSAGE: &str = "User not found.";
pub(crate) const USER_FORBIDDEN_MESSAGE: &str = "No access to this user (no permission).";
pub(crate) const CREATE_FORBIDDEN_MESSAGE: &str =
    "No access to this functionality (no permission).";
pub(crate) const DUPLICATE_USER_MESSAGE: &str =
    "User with the same email or username already exists.";
pub(crate) const DUPLICATE_USERNAME_MESSAGE: &str = "User with the same username already exists.";
pub(crate) const DUPLICATE_EMAIL_MESSAGE: &str = "User with the same email already exists.";
pub(crate) const PASSWORD_REQUIRED_MESSAGE: &str = "A password is required.";

/// Coordinator implementing [`UserAdmin`] and [`LoginService`].
#[derive(Clone)]
pub struct UserService<R, H, T> {
    repo: Arc<R>,
    hasher: Arc<H>,
    tokens: Arc<T>,
}

impl<R, H, T> UserService<R, H, T> {
    /// Create a coordinator from its collaborators.
    pub fn new(repo: Arc<R>, hasher: Arc<H>, tokens: Arc<T>) -> Self {
        Self {
            repo,
            hasher,
            tokens,
        }
    }
}

impl<R, H, T> UserService<R, H, T>
where
    R: UserRepository,
    H: PasswordHasher,
    T: TokenGenerator,
{
    fn map_repository_error(error: UserRepositoryError) -> Error {
        debug!(kind = error.kind(), %error, "user repository failure");
        match error {
            UserRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("user repository unavailable: {message}"))
            }
            UserRepositoryError::Query { message } => {
                Error::internal(format!("user repository error: {message}"))
            }
            UserRepositoryError::Duplicate { field } => match field.as_str() {
                "email" => Error::conflict(DUPLICATE_EMAIL_MESSAGE),
                "username" => Error::conflict(DUPLICATE_USERNAME_MESSAGE),
                _ => Error::conflict(DUPLICATE_USER_MESSAGE),
            },
            UserRepositoryError::NotFound { .. } => Error::not_found(USER_NOT_FOUND_MESSAGE),
        }
    }

    fn map_hash_error(error: PasswordHashError) -> Error {
        debug!(kind = error.kind(), "password hasher failure");
        Error::internal(error.to_string())
    }

    fn hash(&self, password: &str) -> Result<PasswordHash, Error> {
        self.hasher.hash(password).map_err(Self::map_hash_error)
    }

    async fn load_user(&self, id: UserId) -> Result<User, Error> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(Self::map_repository_error)?
            .ok_or_else(|| Error::not_found(USER_NOT_FOUND_MESSAGE))
    }

    async fn load_accessible_user(&self, principal: &User, id: UserId) -> Result<User, Error> {
        let target = self.load_user(id).await?;
        if !can_access_user(principal, &target) {
            return Err(Error::forbidden(USER_FORBIDDEN_MESSAGE));
        }
        Ok(target)
    }

    async fn insert(&self, draft: UserDraft) -> Result<User, Error> {
        let password = draft
            .password
            .ok_or_else(|| Error::invalid_request(PASSWORD_REQUIRED_MESSAGE))?;
        let profile = draft.profile;
        let email_taken = self
            .repo
            .email_exists(&profile.email)
            .await
            .map_err(Self::map_repository_error)?;
        let username_taken = self
            .repo
            .username_exists(&profile.username)
            .await
            .map_err(Self::map_repository_error)?;
        if email_taken || username_taken {
            return Err(Error::conflict(DUPLICATE_USER_MESSAGE));
        }

        let password_hash = self.hash(password.as_str())?;
        let token = self.tokens.generate(profile.email.as_ref());
        let user = self
            .repo
            .create(&NewUser {
                profile,
                password_hash,
                token,
            })
            .await
            .map_err(|err| match err {
                UserRepositoryError::Duplicate { .. } => Error::conflict(DUPLICATE_USER_MESSAGE),
                other => Self::map_repository_error(other),
            })?;
        info!(user_id = %user.id(), is_admin = user.is_admin(), "user created");
        Ok(user)
    }

    /// Create an admin account without an acting principal.
    ///
    /// Reserved for operator tooling run against the store directly.
    ///
    /// # Errors
    /// Same as [`UserAdmin::create_user`] minus the admin check.
    pub async fn bootstrap_admin(&self, mut draft: UserDraft) -> Result<User, Error> {
        draft.profile.is_admin = true;
        self.insert(draft).await
    }
}

#[async_trait]
impl<R, H, T> UserAdmin for UserService<R, H, T>
where
    R: UserRepository,
    H: PasswordHasher,
    T: TokenGenerator,
{
    async fn create_user(&self, principal: &User, draft: UserDraft) -> Result<User, Error> {
        if !can_create_user(principal) {
            return Err(Error::forbidden(CREATE_FORBIDDEN_MESSAGE));
        }
        self.insert(draft).await
    }

    async fn get_user(&self, principal: &User, id: UserId) -> Result<User, Error> {
        self.load_accessible_user(principal, id).await
    }

    async fn update_user(
        &self,
        principal: &User,
        id: UserId,
        draft: UserDraft,
    ) -> Result<User, Error> {
        let target = self.load_accessible_user(principal, id).await?;
        let mut profile = draft.profile;

        if profile.username != *target.username()
            && self
                .repo
                .username_exists(&profile.username)
                .await
                .map_err(Self::map_repository_error)?
        {
            return Err(Error::conflict(DUPLICATE_USERNAME_MESSAGE));
        }
        if profile.email != *target.email()
            && self
                .repo
                .email_exists(&profile.email)
                .await
                .map_err(Self::map_repository_error)?
        {
            return Err(Error::conflict(DUPLICATE_EMAIL_MESSAGE));
        }

        profile.is_admin = normalize_admin_flag(principal, profile.is_admin);
        let mut updated = target.with_profile(profile);
        if let Some(password) = draft.password {
            updated = updated.with_password_hash(self.hash(password.as_str())?);
        }

        self.repo
            .update(&updated)
            .await
            .map_err(Self::map_repository_error)?;
        Ok(updated)
    }

    async fn delete_user(&self, principal: &User, id: UserId) -> Result<(), Error> {
        let target = self.load_accessible_user(principal, id).await?;
        self.repo
            .delete(target.id())
            .await
            .map_err(Self::map_repository_error)?;
        info!(user_id = %target.id(), "user deleted");
        Ok(())
    }
}

#[async_trait]
impl<R, H, T> LoginService for UserService<R, H, T>
where
    R: UserRepository,
    H: PasswordHasher,
    T: TokenGenerator,
{
    async fn login(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let Ok(username) = Username::new(credentials.username()) else {
            return Err(credentials_mismatch());
        };
        let user = self
            .repo
            .find_by_username(&username)
            .await
            .map_err(Self::map_repository_error)?
            .ok_or_else(credentials_mismatch)?;
        if !self
            .hasher
            .verify(credentials.password(), user.password_hash())
        {
            return Err(credentials_mismatch());
        }
        Ok(user)
    }

    async fn authenticate(&self, token: &str) -> Result<User, Error> {
        let token = token.trim();
        if token.is_empty() {
            return Err(Error::forbidden(MISSING_TOKEN_MESSAGE));
        }
        self.repo
            .find_by_token(token)
            .await
            .map_err(Self::map_repository_error)?
            .ok_or_else(|| Error::forbidden(INVALID_TOKEN_MESSAGE))
    }
}

#[cfg(test)]
#[path = "user_service_tests.rs"]
mod tests;

//! In-process account store.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{Email, NewUser, User, UserId, Username};

#[derive(Debug, Default)]
struct UserState {
    last_id: i64,
    users: BTreeMap<UserId, User>,
}

impl UserState {
    /// First unique column `candidate` collides with, ignoring `except`.
    fn collision(&self, candidate: &User, except: Option<UserId>) -> Option<&'static str> {
        let others = || {
            self.users
                .values()
                .filter(move |user| Some(user.id()) != except)
        };
        if others().any(|user| user.email() == candidate.email()) {
            return Some("email");
        }
        if others().any(|user| user.username() == candidate.username()) {
            return Some("username");
        }
        if others().any(|user| user.token() == candidate.token()) {
            return Some("token");
        }
        None
    }
}

/// User repository kept in process memory; state is lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    state: Mutex<UserState>,
}

impl InMemoryUserRepository {
    fn lock(&self) -> Result<MutexGuard<'_, UserState>, UserRepositoryError> {
        self.state
            .lock()
            .map_err(|_| UserRepositoryError::query("user store lock poisoned"))
    }

    fn find_where(
        &self,
        predicate: impl Fn(&User) -> bool,
    ) -> Result<Option<User>, UserRepositoryError> {
        Ok(self.lock()?.users.values().find(|user| predicate(user)).cloned())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserRepositoryError> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserRepositoryError> {
        self.find_where(|user| user.username() == username)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<User>, UserRepositoryError> {
        self.find_where(|user| user.token().as_ref() == token)
    }

    async fn email_exists(&self, email: &Email) -> Result<bool, UserRepositoryError> {
        Ok(self.find_where(|user| user.email() == email)?.is_some())
    }

    async fn username_exists(&self, username: &Username) -> Result<bool, UserRepositoryError> {
        Ok(self.find_where(|user| user.username() == username)?.is_some())
    }

    async fn create(&self, user: &NewUser) -> Result<User, UserRepositoryError> {
        let mut state = self.lock()?;
        let candidate = User::new(
            UserId::new(state.last_id + 1),
            user.profile.clone(),
            user.password_hash.clone(),
            user.token.clone(),
        );
        if let Some(field) = state.collision(&candidate, None) {
            return Err(UserRepositoryError::duplicate(field));
        }
        state.last_id += 1;
        state.users.insert(candidate.id(), candidate.clone());
        Ok(candidate)
    }

    async fn update(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut state = self.lock()?;
        let Some(stored) = state.users.get(&user.id()).cloned() else {
            return Err(UserRepositoryError::not_found(user.id().as_i64()));
        };
        let updated = stored
            .with_profile(user.profile().clone())
            .with_password_hash(user.password_hash().clone());
        if let Some(field) = state.collision(&updated, Some(updated.id())) {
            return Err(UserRepositoryError::duplicate(field));
        }
        state.users.insert(updated.id(), updated);
        Ok(())
    }

    async fn delete(&self, id: UserId) -> Result<(), UserRepositoryError> {
        self.lock()?
            .users
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| UserRepositoryError::not_found(id.as_i64()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ApiToken, PasswordHash, UserProfile};
    use rstest::{fixture, rstest};

    #[fixture]
    fn repo() -> InMemoryUserRepository {
        InMemoryUserRepository::default()
    }

    fn new_user(name: &str, token: &str) -> NewUser {
        account(name, name, token)
    }

    fn account(mailbox: &str, name: &str, token: &str) -> NewUser {
        NewUser {
            profile: UserProfile {
                email: Email::new(format!("{mailbox}@example.org")).expect("email"),
                username: Username::new(name).expect("username"),
                is_admin: false,
            },
            password_hash: PasswordHash::new("digest"),
            token: ApiToken::new(token),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn lookups_find_created_users(repo: InMemoryUserRepository) {
        let created = repo.create(&new_user("ops", "tok-1")).await.expect("create");
        assert_eq!(created.id(), UserId::new(1));

        let by_token = repo.find_by_token("tok-1").await.expect("lookup");
        assert_eq!(by_token.as_ref().map(User::id), Some(created.id()));
        assert!(repo.find_by_token("tok-").await.expect("lookup").is_none());
        assert!(
            repo.username_exists(created.username())
                .await
                .expect("exists")
        );
        assert!(repo.email_exists(created.email()).await.expect("exists"));
    }

    #[rstest]
    #[case(account("ops", "other", "tok-2"), "email")]
    #[case(account("other", "ops", "tok-2"), "username")]
    #[case(account("other", "other", "tok-1"), "token")]
    #[tokio::test]
    async fn unique_columns_are_enforced(
        repo: InMemoryUserRepository,
        #[case] duplicate: NewUser,
        #[case] field: &str,
    ) {
        repo.create(&new_user("ops", "tok-1")).await.expect("create");
        let err = repo.create(&duplicate).await.expect_err("duplicate");
        assert_eq!(err, UserRepositoryError::duplicate(field));
    }

    #[rstest]
    #[tokio::test]
    async fn update_keeps_the_token(repo: InMemoryUserRepository) {
        let created = repo.create(&new_user("ops", "tok-1")).await.expect("create");
        let renamed = User::new(
            created.id(),
            UserProfile {
                email: Email::new("ops@example.net").expect("email"),
                username: Username::new("operator").expect("username"),
                is_admin: true,
            },
            PasswordHash::new("new-digest"),
            ApiToken::new("forged"),
        );
        repo.update(&renamed).await.expect("update");

        let stored = repo
            .find_by_id(created.id())
            .await
            .expect("find")
            .expect("user");
        assert_eq!(stored.username().as_ref(), "operator");
        assert_eq!(stored.token().as_ref(), "tok-1");
        assert_eq!(stored.password_hash().as_ref(), "new-digest");
    }

    #[rstest]
    #[tokio::test]
    async fn update_rejects_a_taken_username(repo: InMemoryUserRepository) {
        repo.create(&new_user("ops", "tok-1")).await.expect("create");
        let other = repo.create(&new_user("dev", "tok-2")).await.expect("create");
        let clash = other.clone().with_profile(UserProfile {
            email: other.email().clone(),
            username: Username::new("ops").expect("username"),
            is_admin: false,
        });
        let err = repo.update(&clash).await.expect_err("taken");
        assert_eq!(err, UserRepositoryError::duplicate("username"));
    }

    #[rstest]
    #[tokio::test]
    async fn delete_removes_and_reports_missing(repo: InMemoryUserRepository) {
        let created = repo.create(&new_user("ops", "tok-1")).await.expect("create");
        repo.delete(created.id()).await.expect("delete");
        assert!(repo.find_by_id(created.id()).await.expect("find").is_none());
        let err = repo.delete(created.id()).await.expect_err("missing");
        assert!(matches!(err, UserRepositoryError::NotFound { .. }));
    }
}

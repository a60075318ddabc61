//! PostgreSQL-backed `UserRepository`.

use async_trait::async_trait;
use diesel::OptionalExtension as _;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{Email, NewUser, User, UserId, Username};

use super::diesel_error_mapping::{StoreFailure, classify_diesel_error, classify_pool_error};
use super::models::{NewUserRow, UserChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Columns carrying a unique constraint, in the order collisions are
/// reported.
const UNIQUE_COLUMNS: [&str; 3] = ["email", "username", "token"];

/// Diesel-backed account store.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Wrap a connection pool.
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: StoreFailure) -> UserRepositoryError {
    if let Some(column) = UNIQUE_COLUMNS
        .into_iter()
        .find(|column| failure.violates(column))
    {
        return UserRepositoryError::duplicate(column);
    }
    match failure {
        StoreFailure::Connection(message) => UserRepositoryError::connection(message),
        StoreFailure::UniqueViolation { constraint } => UserRepositoryError::duplicate(
            constraint.unwrap_or_else(|| "unique field".to_owned()),
        ),
        StoreFailure::Query(message) => UserRepositoryError::query(message),
    }
}

fn map_pool_error(error: PoolError) -> UserRepositoryError {
    map_failure(classify_pool_error(error))
}

fn map_diesel_error(error: DieselError) -> UserRepositoryError {
    map_failure(classify_diesel_error(error))
}

fn to_user(row: UserRow) -> Result<User, UserRepositoryError> {
    User::try_from(row).map_err(UserRepositoryError::query)
}

/// The unique keys an account can be fetched by.
#[derive(Debug, Clone, PartialEq, Eq)]
enum UserLookup {
    Id(i64),
    Username(String),
    Token(String),
}

impl UserLookup {
    const fn column(&self) -> &'static str {
        match self {
            Self::Id(_) => "id",
            Self::Username(_) => "username",
            Self::Token(_) => "token",
        }
    }
}

impl DieselUserRepository {
    async fn find_one(&self, lookup: UserLookup) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        debug!(column = lookup.column(), "user lookup");
        let row = match lookup {
            UserLookup::Id(id) => {
                users::table
                    .filter(users::id.eq(id))
                    .select(UserRow::as_select())
                    .first(&mut conn)
                    .await
            }
            UserLookup::Username(username) => {
                users::table
                    .filter(users::username.eq(username))
                    .select(UserRow::as_select())
                    .first(&mut conn)
                    .await
            }
            UserLookup::Token(token) => {
                users::table
                    .filter(users::token.eq(token))
                    .select(UserRow::as_select())
                    .first(&mut conn)
                    .await
            }
        };
        row.optional()
            .map_err(map_diesel_error)?
            .map(to_user)
            .transpose()
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserRepositoryError> {
        self.find_one(UserLookup::Id(id.as_i64())).await
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserRepositoryError> {
        self.find_one(UserLookup::Username(username.as_ref().to_owned()))
            .await
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<User>, UserRepositoryError> {
        self.find_one(UserLookup::Token(token.to_owned())).await
    }

    async fn email_exists(&self, email: &Email) -> Result<bool, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            users::table.filter(users::email.eq(email.as_ref())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn username_exists(&self, username: &Username) -> Result<bool, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            users::table.filter(users::username.eq(username.as_ref())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn create(&self, user: &NewUser) -> Result<User, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::insert_into(users::table)
            .values(NewUserRow::from(user))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        to_user(row)
    }

    async fn update(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(users::table.find(user.id().as_i64()))
            .set(UserChangeset::from(user))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(UserRepositoryError::not_found(user.id().as_i64()));
        }
        Ok(())
    }

    async fn delete(&self, id: UserId) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(users::table.find(id.as_i64()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if deleted == 0 {
            return Err(UserRepositoryError::not_found(id.as_i64()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("users_email_key", "email")]
    #[case("users_username_key", "username")]
    #[case("users_token_key", "token")]
    fn unique_violations_name_the_column(#[case] constraint: &str, #[case] field: &str) {
        let err = map_failure(StoreFailure::UniqueViolation {
            constraint: Some(constraint.to_owned()),
        });
        assert_eq!(err, UserRepositoryError::duplicate(field));
    }

    #[rstest]
    fn unknown_constraints_keep_their_name() {
        let err = map_failure(StoreFailure::UniqueViolation {
            constraint: Some("users_pkey".to_owned()),
        });
        assert_eq!(err, UserRepositoryError::duplicate("users_pkey"));
    }

    #[rstest]
    fn checkout_failures_are_connection_errors() {
        let err = map_pool_error(PoolError::checkout("refused"));
        assert!(matches!(err, UserRepositoryError::Connection { .. }));
    }

    #[rstest]
    #[case(UserLookup::Id(7), "id")]
    #[case(UserLookup::Username("ops".to_owned()), "username")]
    #[case(UserLookup::Token("abc".to_owned()), "token")]
    fn lookups_name_a_unique_column(#[case] lookup: UserLookup, #[case] column: &str) {
        assert_eq!(lookup.column(), column);
        assert!(UNIQUE_COLUMNS.contains(&column) || column == "id");
    }

    #[rstest]
    fn statement_failures_are_query_errors() {
        let err = map_diesel_error(DieselError::NotFound);
        assert!(matches!(err, UserRepositoryError::Query { .. }));
    }
}

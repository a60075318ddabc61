//! Shared Diesel error classification for the zone and user repositories.
//!
//! Each repository turns a [`StoreFailure`] into its own port error, so the
//! logging and the unique-violation detection live in one place.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// What went wrong, reduced to the cases the ports distinguish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StoreFailure {
    /// The database could not be reached or dropped the connection.
    Connection(String),
    /// A unique constraint rejected the write.
    UniqueViolation { constraint: Option<String> },
    /// Any other failed statement.
    Query(String),
}

impl StoreFailure {
    /// Whether a unique violation hit a constraint whose name mentions
    /// `column`. Postgres names inline constraints `<table>_<column>_key`.
    pub(crate) fn violates(&self, column: &str) -> bool {
        matches!(
            self,
            Self::UniqueViolation { constraint: Some(name) } if name.contains(column)
        )
    }
}

/// Pool checkout and build failures are always connection problems.
pub(crate) fn classify_pool_error(error: PoolError) -> StoreFailure {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            StoreFailure::Connection(message)
        }
    }
}

/// Classify a Diesel error, logging the driver detail at debug level.
pub(crate) fn classify_diesel_error(error: DieselError) -> StoreFailure {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                constraint = info.constraint_name(),
                "diesel operation failed"
            );
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            error = %error,
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            StoreFailure::UniqueViolation {
                constraint: info.constraint_name().map(str::to_owned),
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            StoreFailure::Connection("database connection error".to_owned())
        }
        DieselError::DatabaseError(_, info) => StoreFailure::Query(info.message().to_owned()),
        DieselError::NotFound => StoreFailure::Query("row not found".to_owned()),
        DieselError::QueryBuilderError(_) => StoreFailure::Query("database query error".to_owned()),
        other => StoreFailure::Query(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_errors_are_connection_failures() {
        let failure = classify_pool_error(PoolError::checkout("connection refused"));
        assert_eq!(
            failure,
            StoreFailure::Connection("connection refused".to_owned())
        );
    }

    #[rstest]
    fn not_found_is_a_query_failure() {
        assert!(matches!(
            classify_diesel_error(DieselError::NotFound),
            StoreFailure::Query(_)
        ));
    }

    #[rstest]
    #[case(Some("users_email_key"), "email", true)]
    #[case(Some("users_username_key"), "email", false)]
    #[case(None, "email", false)]
    fn unique_violations_name_their_column(
        #[case] constraint: Option<&str>,
        #[case] column: &str,
        #[case] expected: bool,
    ) {
        let failure = StoreFailure::UniqueViolation {
            constraint: constraint.map(str::to_owned),
        };
        assert_eq!(failure.violates(column), expected);
    }
}

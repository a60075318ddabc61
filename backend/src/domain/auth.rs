//! Login credentials and the fixed messages returned on authentication failure.
//!
//! Both failure paths answer with `403 Forbidden` rather than `401`: a request
//! without a usable credential is treated as denied, not as a challenge.

use std::fmt;

use zeroize::Zeroizing;

use super::Error;

/// Message returned when the credential header is absent or blank.
pub const MISSING_TOKEN_MESSAGE: &str = "Missing access token.";
/// Message returned when no user holds the supplied token.
pub const INVALID_TOKEN_MESSAGE: &str = "Token invalid.";
/// Message returned when a username/password pair does not match.
pub const CREDENTIALS_MISMATCH_MESSAGE: &str = "Credentials don't match.";

/// Raised when a login form is incomplete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    EmptyUsername,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Username/password pair submitted to `POST /login`.
///
/// The username is trimmed; the password is kept verbatim and wiped from
/// memory on drop.
///
/// # Examples
/// ```
/// use zone_api::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" hostmaster ", "s3cret").unwrap();
/// assert_eq!(creds.username(), "hostmaster");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Validate raw form values.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            username: username.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username used for the lookup.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password as submitted.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Uniform rejection for any failed login.
pub fn credentials_mismatch() -> Error {
    Error::forbidden(CREDENTIALS_MISMATCH_MESSAGE)
}

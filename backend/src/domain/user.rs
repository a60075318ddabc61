//! User (principal) data model.
//!
//! A [`User`] is both an account and the principal acting on requests. The
//! password digest and API token are opaque to the domain: they are produced
//! by the [`PasswordHasher`](crate::domain::ports::PasswordHasher) and
//! [`TokenGenerator`](crate::domain::ports::TokenGenerator) ports.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Maximum allowed length for a username.
pub const USERNAME_MAX: usize = 64;
/// Maximum allowed length for an email address.
pub const EMAIL_MAX: usize = 254;

/// Validation errors returned by the user value constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// Blank email.
    EmptyEmail,
    /// Not of the form `local@domain`, too long, or containing whitespace.
    InvalidEmail,
    /// Blank username.
    EmptyUsername,
    /// Username over [`USERNAME_MAX`] characters.
    UsernameTooLong { max: usize },
    /// Whitespace or control characters in the username.
    UsernameInvalidCharacters,
    /// Password supplied but empty.
    EmptyPassword,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidEmail => write!(f, "email must look like local@domain"),
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::UsernameTooLong { max } => {
                write!(f, "username must be at most {max} characters")
            }
            Self::UsernameInvalidCharacters => {
                write!(f, "username must not contain whitespace")
            }
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Store-assigned user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a raw identifier.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw identifier value.
    pub const fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Contact address, also used as the SOA responsible-person mailbox.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate and construct an [`Email`].
    pub fn new(email: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::from_owned(email.into())
    }

    fn from_owned(email: String) -> Result<Self, UserValidationError> {
        let trimmed = email.trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if trimmed.len() > EMAIL_MAX || trimmed.chars().any(char::is_whitespace) {
            return Err(UserValidationError::InvalidEmail);
        }
        match trimmed.split_once('@') {
            Some((local, domain))
                if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
            {
                Ok(Self(trimmed.to_owned()))
            }
            _ => Err(UserValidationError::InvalidEmail),
        }
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Unique login name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`].
    pub fn new(username: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::from_owned(username.into())
    }

    fn from_owned(username: String) -> Result<Self, UserValidationError> {
        let trimmed = username.trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        if trimmed.chars().count() > USERNAME_MAX {
            return Err(UserValidationError::UsernameTooLong { max: USERNAME_MAX });
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(UserValidationError::UsernameInvalidCharacters);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Opaque bearer credential resolved to a user by exact match.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ApiToken(String);

impl ApiToken {
    /// Wrap an already generated token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl AsRef<str> for ApiToken {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken(..)")
    }
}

/// Stored password digest; opaque outside the hasher adapter.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded digest.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

/// Mutable account attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub email: Email,
    pub username: Username,
    pub is_admin: bool,
}

/// Account and principal.
///
/// `id` and `token` never change after creation.
///
/// # Examples
/// ```
/// use zone_api::domain::{ApiToken, Email, PasswordHash, User, UserId, UserProfile, Username};
///
/// let user = User::new(
///     UserId::new(1),
///     UserProfile {
///         email: Email::new("hostmaster@example.org").unwrap(),
///         username: Username::new("hostmaster").unwrap(),
///         is_admin: true,
///     },
///     PasswordHash::new("digest"),
///     ApiToken::new("token"),
/// );
/// assert!(user.is_admin());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    profile: UserProfile,
    password_hash: PasswordHash,
    token: ApiToken,
}

impl User {
    /// Assemble a user from stored parts.
    pub fn new(
        id: UserId,
        profile: UserProfile,
        password_hash: PasswordHash,
        token: ApiToken,
    ) -> Self {
        Self {
            id,
            profile,
            password_hash,
            token,
        }
    }

    /// Stable identifier.
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Contact address.
    pub fn email(&self) -> &Email {
        &self.profile.email
    }

    /// Login name.
    pub fn username(&self) -> &Username {
        &self.profile.username
    }

    /// Whether the user holds the admin capability.
    pub fn is_admin(&self) -> bool {
        self.profile.is_admin
    }

    /// Mutable attributes.
    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    /// Stored password digest.
    pub fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }

    /// Bearer credential.
    pub fn token(&self) -> &ApiToken {
        &self.token
    }

    /// Replace the mutable attributes, keeping identity and token.
    pub fn with_profile(mut self, profile: UserProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Replace the stored password digest.
    pub fn with_password_hash(mut self, password_hash: PasswordHash) -> Self {
        self.password_hash = password_hash;
        self
    }
}

/// User row ready for insertion; the store assigns the identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub profile: UserProfile,
    pub password_hash: PasswordHash,
    pub token: ApiToken,
}

/// Validated create/update payload.
///
/// `password` is optional so updates can leave the stored digest untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDraft {
    pub profile: UserProfile,
    pub password: Option<Zeroizing<String>>,
}

impl UserDraft {
    /// Validate raw payload parts.
    pub fn try_from_parts(
        email: &str,
        username: &str,
        password: Option<&str>,
        is_admin: bool,
    ) -> Result<Self, UserValidationError> {
        let email = Email::new(email)?;
        let username = Username::new(username)?;
        let password = match password {
            Some("") => return Err(UserValidationError::EmptyPassword),
            Some(value) => Some(Zeroizing::new(value.to_owned())),
            None => None,
        };
        Ok(Self {
            profile: UserProfile {
                email,
                username,
                is_admin,
            },
            password,
        })
    }
}

//! Port for one-way password digests.
//!
//! The algorithm is an adapter concern; services only hash on write and
//! verify on login.

use crate::domain::PasswordHash;

use super::define_port_error;

define_port_error! {
    /// Errors raised while producing a digest.
    pub enum PasswordHashError {
        /// The adapter could not derive a digest.
        Hashing { message: String } => "password hashing failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Derive a fresh salted digest for `password`.
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHashError>;

    /// Whether `password` produces `hash`.
    fn verify(&self, password: &str, hash: &PasswordHash) -> bool;
}

//! Credential adapters: bcrypt password digests and random bearer tokens.
//!
//! Digests are modular-crypt bcrypt strings (`$2b$<cost>$...`), so the cost
//! travels with every stored hash. Tokens are the base64 form of the seed
//! followed by sixteen hex characters of randomness.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use rand::RngCore as _;

use crate::domain::ports::{PasswordHashError, PasswordHasher, TokenGenerator};
use crate::domain::{ApiToken, PasswordHash};

/// Work factor used unless the operator picks another one.
pub const DEFAULT_PASSWORD_COST: u32 = 14;
/// Smallest work factor bcrypt accepts.
pub const MIN_PASSWORD_COST: u32 = 4;
/// Largest work factor bcrypt accepts.
pub const MAX_PASSWORD_COST: u32 = 31;

const TOKEN_ENTROPY_LEN: usize = 8;

/// Password digests produced with bcrypt at a fixed work factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    /// Hash with `cost`; values outside bcrypt's range fail at hash time.
    #[must_use]
    pub const fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Configured work factor.
    #[must_use]
    pub const fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_PASSWORD_COST)
    }
}

impl PasswordHasher for BcryptPasswordHasher {
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHashError> {
        bcrypt::hash(password, self.cost)
            .map(PasswordHash::new)
            .map_err(|err| PasswordHashError::hashing(err.to_string()))
    }

    fn verify(&self, password: &str, hash: &PasswordHash) -> bool {
        bcrypt::verify(password, hash.as_ref()).unwrap_or(false)
    }
}

/// Bearer tokens personalised with a seed (the account email).
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTokenGenerator;

impl TokenGenerator for RandomTokenGenerator {
    fn generate(&self, seed: &str) -> ApiToken {
        let mut entropy = [0_u8; TOKEN_ENTROPY_LEN];
        rand::thread_rng().fill_bytes(&mut entropy);
        let raw = format!("{seed}{}", hex::encode(entropy));
        ApiToken::new(STANDARD.encode(raw))
    }
}

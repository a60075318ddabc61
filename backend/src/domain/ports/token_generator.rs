//! Port for minting opaque bearer tokens.

use crate::domain::ApiToken;

#[cfg_attr(test, mockall::automock)]
pub trait TokenGenerator: Send + Sync {
    /// Mint a new token. `seed` personalises the token but must not make it
    /// predictable.
    fn generate(&self, seed: &str) -> ApiToken;
}

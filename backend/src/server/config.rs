//! Resolved server configuration handed to [`super::create_server`].

use std::net::SocketAddr;

use crate::domain::{UserDraft, ZonePolicy};
use crate::outbound::persistence::DbPool;
use crate::outbound::security::BcryptPasswordHasher;

/// Everything the server needs once settings have been validated.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) policy: ZonePolicy,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) password_hasher: BcryptPasswordHasher,
    pub(crate) bootstrap_admin: Option<UserDraft>,
}

impl ServerConfig {
    /// Serve on `bind_addr` with the in-memory stores.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, policy: ZonePolicy) -> Self {
        Self {
            bind_addr,
            policy,
            db_pool: None,
            password_hasher: BcryptPasswordHasher::default(),
            bootstrap_admin: None,
        }
    }

    /// Back the repositories with PostgreSQL.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Hash stored passwords with `hasher`.
    #[must_use]
    pub fn with_password_hasher(mut self, hasher: BcryptPasswordHasher) -> Self {
        self.password_hasher = hasher;
        self
    }

    /// Seed the in-memory user store with this administrator.
    #[must_use]
    pub fn with_bootstrap_admin(mut self, admin: UserDraft) -> Self {
        self.bootstrap_admin = Some(admin);
        self
    }

    /// Socket address the server binds to.
    #[must_use]
    pub const fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    /// Zone policy passed to the coordinator.
    #[must_use]
    pub const fn policy(&self) -> &ZonePolicy {
        &self.policy
    }

    /// Whether the PostgreSQL adapters are in use.
    #[must_use]
    pub const fn is_persistent(&self) -> bool {
        self.db_pool.is_some()
    }
}

//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{DomainAdmin, LoginService, RecordAdmin, UserAdmin};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Credential resolution and login.
    pub login: Arc<dyn LoginService>,
    /// Domain use-cases.
    pub domains: Arc<dyn DomainAdmin>,
    /// Record use-cases.
    pub records: Arc<dyn RecordAdmin>,
    /// Account use-cases.
    pub users: Arc<dyn UserAdmin>,
}

impl HttpState {
    /// Construct state from explicit port implementations.
    ///
    /// The zone coordinator usually backs both `domains` and `records`, and
    /// the user coordinator both `login` and `users`.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use zone_api::domain::{UserService, ZonePolicy, ZoneService};
    /// use zone_api::inbound::http::state::HttpState;
    /// use zone_api::outbound::memory::{InMemoryUserRepository, InMemoryZoneRepository};
    /// use zone_api::outbound::security::{BcryptPasswordHasher, RandomTokenGenerator};
    ///
    /// let zones = Arc::new(ZoneService::new(
    ///     Arc::new(InMemoryZoneRepository::default()),
    ///     ZonePolicy::default(),
    ///     Arc::new(DefaultClock),
    /// ));
    /// let users = Arc::new(UserService::new(
    ///     Arc::new(InMemoryUserRepository::default()),
    ///     Arc::new(BcryptPasswordHasher::default()),
    ///     Arc::new(RandomTokenGenerator),
    /// ));
    /// let state = HttpState::new(users.clone(), zones.clone(), zones, users);
    /// let _login = state.login.clone();
    /// ```
    pub fn new(
        login: Arc<dyn LoginService>,
        domains: Arc<dyn DomainAdmin>,
        records: Arc<dyn RecordAdmin>,
        users: Arc<dyn UserAdmin>,
    ) -> Self {
        Self {
            login,
            domains,
            records,
            users,
        }
    }
}

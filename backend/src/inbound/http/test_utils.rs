//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::web;

use crate::domain::ports::{MockDomainAdmin, MockLoginService, MockRecordAdmin, MockUserAdmin};
use crate::domain::{ApiToken, Email, PasswordHash, User, UserId, UserProfile, Username};
use crate::inbound::http::state::HttpState;

/// Token accepted by [`TestPorts::authenticating`].
pub const TEST_TOKEN: &str = "test-token";

/// Build a user whose name, email and token derive from `id`.
pub fn test_user(id: i64, is_admin: bool) -> User {
    User::new(
        UserId::new(id),
        UserProfile {
            email: Email::new(format!("user{id}@example.org")).expect("fixture email"),
            username: Username::new(format!("user{id}")).expect("fixture username"),
            is_admin,
        },
        PasswordHash::new("fixture-digest"),
        ApiToken::new(format!("token-{id}")),
    )
}

/// Mocked driving ports wired into [`HttpState`].
#[derive(Default)]
pub struct TestPorts {
    pub login: MockLoginService,
    pub domains: MockDomainAdmin,
    pub records: MockRecordAdmin,
    pub users: MockUserAdmin,
}

impl TestPorts {
    /// Ports whose login service resolves [`TEST_TOKEN`] to `principal`.
    pub fn authenticating(principal: User) -> Self {
        let mut ports = Self::default();
        ports
            .login
            .expect_authenticate()
            .withf(|token| token == TEST_TOKEN)
            .returning(move |_| Ok(principal.clone()));
        ports
    }

    /// Freeze the mocks into handler state.
    pub fn into_state(self) -> web::Data<HttpState> {
        web::Data::new(HttpState::new(
            Arc::new(self.login),
            Arc::new(self.domains),
            Arc::new(self.records),
            Arc::new(self.users),
        ))
    }
}

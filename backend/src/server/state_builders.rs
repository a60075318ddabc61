//! Wire coordinators and adapters into [`HttpState`].

use std::io;
use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tracing::{info, warn};

use crate::domain::ports::{UserRepository, ZoneRepository};
use crate::domain::{Error, UserDraft, UserService, ZonePolicy, ZoneService};
use crate::inbound::http::state::HttpState;
use crate::outbound::memory::{InMemoryUserRepository, InMemoryZoneRepository};
use crate::outbound::persistence::{DieselUserRepository, DieselZoneRepository};
use crate::outbound::security::{BcryptPasswordHasher, RandomTokenGenerator};

use super::ServerConfig;

/// Account coordinator with the production credential adapters.
pub type AccountService<R> = UserService<R, BcryptPasswordHasher, RandomTokenGenerator>;

/// Build the account coordinator over `repo`.
pub fn account_service<R>(repo: Arc<R>, hasher: BcryptPasswordHasher) -> AccountService<R>
where
    R: UserRepository,
{
    UserService::new(repo, Arc::new(hasher), Arc::new(RandomTokenGenerator))
}

/// Assemble handler state from one zone and one user repository.
///
/// The zone coordinator serves both the domain and record ports, the account
/// coordinator both login and user administration.
pub fn assemble_http_state<Z, U>(
    zones: Arc<Z>,
    users: Arc<U>,
    policy: ZonePolicy,
    hasher: BcryptPasswordHasher,
) -> HttpState
where
    Z: ZoneRepository + 'static,
    U: UserRepository + 'static,
{
    let zone_service = Arc::new(ZoneService::new(zones, policy, Arc::new(DefaultClock)));
    let account_service = Arc::new(account_service(users, hasher));
    HttpState::new(
        account_service.clone(),
        zone_service.clone(),
        zone_service,
        account_service,
    )
}

/// In-memory state seeded with one administrator; everything is lost on
/// restart.
///
/// # Errors
///
/// Whatever [`UserService::bootstrap_admin`] reports for `admin`.
pub async fn memory_http_state(
    policy: ZonePolicy,
    hasher: BcryptPasswordHasher,
    admin: UserDraft,
) -> Result<HttpState, Error> {
    let users = Arc::new(InMemoryUserRepository::default());
    let seeded = account_service(users.clone(), hasher)
        .bootstrap_admin(admin)
        .await?;
    info!(user_id = %seeded.id(), username = %seeded.username(), "bootstrap administrator created");
    Ok(assemble_http_state(
        Arc::new(InMemoryZoneRepository::default()),
        users,
        policy,
        hasher,
    ))
}

/// Pick PostgreSQL when a pool is configured, memory otherwise.
///
/// The in-memory store starts empty, so it needs a bootstrap administrator;
/// without one no request could ever authenticate.
pub(crate) async fn build_http_state(config: &ServerConfig) -> io::Result<web::Data<HttpState>> {
    let state = match (&config.db_pool, &config.bootstrap_admin) {
        (Some(pool), admin) => {
            if admin.is_some() {
                warn!("admin_* settings are ignored with a database; use create-admin");
            }
            assemble_http_state(
                Arc::new(DieselZoneRepository::new(pool.clone())),
                Arc::new(DieselUserRepository::new(pool.clone())),
                config.policy.clone(),
                config.password_hasher,
            )
        }
        (None, Some(admin)) => memory_http_state(
            config.policy.clone(),
            config.password_hasher,
            admin.clone(),
        )
        .await
        .map_err(|err| io::Error::other(format!("seed administrator: {}", err.message())))?,
        (None, None) => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "the in-memory store needs admin_email, admin_username and admin_password",
            ));
        }
    };
    Ok(web::Data::new(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::User;
    use crate::domain::ports::LoginService as _;
    use crate::domain::LoginCredentials;
    use crate::outbound::security::MIN_PASSWORD_COST;
    use rstest::{fixture, rstest};

    #[fixture]
    fn hasher() -> BcryptPasswordHasher {
        BcryptPasswordHasher::new(MIN_PASSWORD_COST)
    }

    fn admin_draft() -> UserDraft {
        UserDraft::try_from_parts("root@example.org", "root", Some("pw"), false).expect("draft")
    }

    #[rstest]
    #[tokio::test]
    async fn memory_state_logs_in_bootstrapped_admins(hasher: BcryptPasswordHasher) {
        let users = Arc::new(InMemoryUserRepository::default());
        let admin = account_service(users.clone(), hasher)
            .bootstrap_admin(admin_draft())
            .await
            .expect("admin");
        assert!(admin.is_admin());

        let state = assemble_http_state(
            Arc::new(InMemoryZoneRepository::default()),
            users,
            ZonePolicy::default(),
            hasher,
        );
        let resolved: User = state
            .login
            .authenticate(admin.token().as_ref())
            .await
            .expect("principal");
        assert_eq!(resolved.id(), admin.id());
    }

    #[rstest]
    #[tokio::test]
    async fn seeded_memory_state_accepts_the_admin_login(hasher: BcryptPasswordHasher) {
        let state = memory_http_state(ZonePolicy::default(), hasher, admin_draft())
            .await
            .expect("state");
        let credentials = LoginCredentials::try_from_parts("root", "pw").expect("credentials");
        let admin = state.login.login(&credentials).await.expect("login");
        assert!(admin.is_admin());
        assert!(admin.password_hash().as_ref().starts_with("$2b$04$"));
    }

    #[rstest]
    #[tokio::test]
    async fn memory_mode_without_an_admin_refuses_to_start() {
        let config = ServerConfig::new("127.0.0.1:0".parse().expect("addr"), ZonePolicy::default());
        let err = build_http_state(&config).await.err().expect("missing admin");
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[rstest]
    #[tokio::test]
    async fn memory_mode_with_an_admin_builds_state(hasher: BcryptPasswordHasher) {
        let config = ServerConfig::new("127.0.0.1:0".parse().expect("addr"), ZonePolicy::default())
            .with_password_hasher(hasher)
            .with_bootstrap_admin(admin_draft());
        assert!(build_http_state(&config).await.is_ok());
    }
}

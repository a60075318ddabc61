//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod domain_admin;
mod login_service;
mod password_hasher;
mod record_admin;
mod token_generator;
mod user_admin;
mod user_repository;
mod zone_repository;

pub use domain_admin::DomainAdmin;
#[cfg(test)]
pub use domain_admin::MockDomainAdmin;
pub use login_service::LoginService;
#[cfg(test)]
pub use login_service::MockLoginService;
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use record_admin::MockRecordAdmin;
pub use record_admin::RecordAdmin;
#[cfg(test)]
pub use token_generator::MockTokenGenerator;
pub use token_generator::TokenGenerator;
#[cfg(test)]
pub use user_admin::MockUserAdmin;
pub use user_admin::UserAdmin;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserRepository, UserRepositoryError};
#[cfg(test)]
pub use zone_repository::MockZoneRepository;
pub use zone_repository::{RecordMutation, ZoneMutation, ZoneRepository, ZoneRepositoryError};

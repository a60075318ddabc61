//! Domain primitives, aggregates and use-case services.
//!
//! Purpose: model users, zones and records as strongly typed values, keep
//! the authorization and SOA rules as pure functions, and implement the
//! driving ports on top of the driven ones.
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and stable identifier.
//! - User, Domain, Record and their identifiers, drafts and validators.
//! - `authorization`: ownership predicates and field normalisation.
//! - SoaPolicy / SoaStamp: the zone consistency computation.
//! - ZoneService / UserService: coordinators behind the HTTP adapters.

pub mod auth;
pub mod authorization;
pub mod error;
mod fqdn;
pub mod ports;
mod soa;
mod trace_id;
pub mod user;
mod user_service;
mod zone;
mod zone_policy;
mod zone_service;

pub use self::auth::{
    CREDENTIALS_MISMATCH_MESSAGE, INVALID_TOKEN_MESSAGE, LoginCredentials, LoginValidationError,
    MISSING_TOKEN_MESSAGE,
};
pub use self::error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use self::fqdn::{FQDN_MAX, Fqdn, FqdnValidationError};
pub use self::soa::{
    DEFAULT_SOA_EXPIRE, DEFAULT_SOA_MINIMUM, DEFAULT_SOA_REFRESH, DEFAULT_SOA_RETRY, SoaPolicy,
    SoaRefresh, SoaStamp, soa_contact,
};
pub use self::trace_id::TraceId;
pub use self::user::{
    ApiToken, EMAIL_MAX, Email, NewUser, PasswordHash, USERNAME_MAX, User, UserDraft, UserId,
    UserProfile, UserValidationError, Username,
};
pub use self::user_service::UserService;
pub use self::zone::{
    Domain, DomainChanges, DomainDraft, DomainId, NewDomain, Record, RecordData, RecordDraft,
    RecordId, RecordType, RecordValidationError, Serial, Ttl,
};
pub use self::zone_policy::ZonePolicy;
pub use self::zone_service::ZoneService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use zone_api::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("No access to this domain (no permission)."))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;

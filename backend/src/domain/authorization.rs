//! Ownership and capability rules for domains, records and user accounts.
//!
//! Everything here is a pure function over entities the caller has already
//! loaded. Callers check existence first and only then ask these predicates,
//! so a missing entity reports `404` and a foreign one `403`.
//!
//! Records have no owner of their own: access to a record is access to its
//! parent domain.

use super::{Domain, User, UserId};

/// True when `principal` may read or mutate `domain` and its records.
pub fn can_access_domain(principal: &User, domain: &Domain) -> bool {
    principal.is_admin() || domain.owner_id() == principal.id()
}

/// True when `principal` may read or mutate the account `target`.
pub fn can_access_user(principal: &User, target: &User) -> bool {
    principal.is_admin() || principal.id() == target.id()
}

/// True when `principal` may create new accounts.
pub fn can_create_user(principal: &User) -> bool {
    principal.is_admin()
}

/// Owner recorded for a domain created or updated by `principal`.
///
/// Admins may act for anyone; everyone else is silently redirected to
/// themselves. `fallback` applies when nothing was requested.
pub fn normalize_owner(principal: &User, requested: Option<UserId>, fallback: UserId) -> UserId {
    if principal.is_admin() {
        requested.unwrap_or(fallback)
    } else {
        principal.id()
    }
}

/// Admin flag recorded for an account written by `principal`.
///
/// Only admins can grant the capability; a non-admin request is downgraded
/// to `false` rather than refused.
pub fn normalize_admin_flag(principal: &User, requested: bool) -> bool {
    principal.is_admin() && requested
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        ApiToken, DomainId, Email, Fqdn, PasswordHash, Serial, UserProfile, Username,
    };
    use rstest::{fixture, rstest};

    fn user(id: i64, is_admin: bool) -> User {
        User::new(
            UserId::new(id),
            UserProfile {
                email: Email::new(format!("user{id}@example.org")).expect("email"),
                username: Username::new(format!("user{id}")).expect("username"),
                is_admin,
            },
            PasswordHash::new("digest"),
            ApiToken::new(format!("token-{id}")),
        )
    }

    #[fixture]
    fn domain_of_alice() -> Domain {
        Domain::new(
            DomainId::new(10),
            UserId::new(1),
            Fqdn::new("example.org.").expect("fqdn"),
            "",
            Serial::default(),
        )
    }

    #[rstest]
    #[case(user(1, false), true)]
    #[case(user(2, false), false)]
    #[case(user(3, true), true)]
    fn domain_access(#[case] principal: User, #[case] expected: bool, domain_of_alice: Domain) {
        assert_eq!(can_access_domain(&principal, &domain_of_alice), expected);
    }

    #[rstest]
    #[case(user(1, false), user(1, false), true)]
    #[case(user(1, false), user(2, false), false)]
    #[case(user(9, true), user(2, false), true)]
    fn user_access(#[case] principal: User, #[case] target: User, #[case] expected: bool) {
        assert_eq!(can_access_user(&principal, &target), expected);
    }

    #[rstest]
    fn only_admins_create_users() {
        assert!(can_create_user(&user(1, true)));
        assert!(!can_create_user(&user(1, false)));
    }

    #[rstest]
    #[case(user(1, false), Some(7), 1)]
    #[case(user(1, false), None, 1)]
    #[case(user(5, true), Some(7), 7)]
    #[case(user(5, true), None, 42)]
    fn owner_normalisation(
        #[case] principal: User,
        #[case] requested: Option<i64>,
        #[case] expected: i64,
    ) {
        let owner = normalize_owner(&principal, requested.map(UserId::new), UserId::new(42));
        assert_eq!(owner, UserId::new(expected));
    }

    #[rstest]
    #[case(false, true, false)]
    #[case(false, false, false)]
    #[case(true, true, true)]
    #[case(true, false, false)]
    fn admin_flag_normalisation(
        #[case] principal_is_admin: bool,
        #[case] requested: bool,
        #[case] expected: bool,
    ) {
        let principal = user(1, principal_is_admin);
        assert_eq!(normalize_admin_flag(&principal, requested), expected);
    }
}

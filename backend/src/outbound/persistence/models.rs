//! Internal Diesel row structs and their conversion into domain values.
//!
//! Rows never leave the persistence layer. Conversions fail with a plain
//! message when a stored value no longer satisfies a domain invariant; the
//! repositories wrap it in their own query error.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::{
    ApiToken, Domain, DomainId, Email, Fqdn, NewDomain, NewUser, PasswordHash, Record,
    RecordData, RecordId, RecordType, Serial, Ttl, User, UserId, UserProfile, Username,
};

use super::schema::{domains, records, users};

/// Row read from `users`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub token: String,
    pub is_admin: bool,
    #[expect(dead_code, reason = "audit column read for completeness")]
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = String;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::new(row.email).map_err(|err| format!("stored email: {err}"))?;
        let username =
            Username::new(row.username).map_err(|err| format!("stored username: {err}"))?;
        Ok(User::new(
            UserId::new(row.id),
            UserProfile {
                email,
                username,
                is_admin: row.is_admin,
            },
            PasswordHash::new(row.password_hash),
            ApiToken::new(row.token),
        ))
    }
}

/// Insertable account.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub email: &'a str,
    pub username: &'a str,
    pub password_hash: &'a str,
    pub token: &'a str,
    pub is_admin: bool,
}

impl<'a> From<&'a NewUser> for NewUserRow<'a> {
    fn from(user: &'a NewUser) -> Self {
        Self {
            email: user.profile.email.as_ref(),
            username: user.profile.username.as_ref(),
            password_hash: user.password_hash.as_ref(),
            token: user.token.as_ref(),
            is_admin: user.profile.is_admin,
        }
    }
}

/// Account columns an update may write; `id` and `token` are absent.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserChangeset<'a> {
    pub email: &'a str,
    pub username: &'a str,
    pub password_hash: &'a str,
    pub is_admin: bool,
}

impl<'a> From<&'a User> for UserChangeset<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            email: user.email().as_ref(),
            username: user.username().as_ref(),
            password_hash: user.password_hash().as_ref(),
            is_admin: user.is_admin(),
        }
    }
}

/// Row read from `domains`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = domains)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct DomainRow {
    pub id: i64,
    pub owner_id: i64,
    pub fqdn: String,
    pub description: String,
    pub serial: i64,
    #[expect(dead_code, reason = "audit column read for completeness")]
    pub created_at: DateTime<Utc>,
}

impl TryFrom<DomainRow> for Domain {
    type Error = String;

    fn try_from(row: DomainRow) -> Result<Self, Self::Error> {
        let fqdn = Fqdn::new(row.fqdn).map_err(|err| format!("stored domain fqdn: {err}"))?;
        let serial = u32::try_from(row.serial)
            .map_err(|_| format!("stored serial {} out of range", row.serial))?;
        Ok(Domain::new(
            DomainId::new(row.id),
            UserId::new(row.owner_id),
            fqdn,
            row.description,
            Serial::new(serial),
        ))
    }
}

/// Insertable domain; `serial` takes the column default of zero.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = domains)]
pub(crate) struct NewDomainRow<'a> {
    pub owner_id: i64,
    pub fqdn: &'a str,
    pub description: &'a str,
}

impl<'a> From<&'a NewDomain> for NewDomainRow<'a> {
    fn from(domain: &'a NewDomain) -> Self {
        Self {
            owner_id: domain.owner_id.as_i64(),
            fqdn: domain.fqdn.as_ref(),
            description: domain.description.as_str(),
        }
    }
}

/// Row read from `records`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = records)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RecordRow {
    pub id: i64,
    pub domain_id: i64,
    pub fqdn: String,
    pub content: String,
    pub record_type: i32,
    pub ttl: i64,
}

impl TryFrom<RecordRow> for Record {
    type Error = String;

    fn try_from(row: RecordRow) -> Result<Self, Self::Error> {
        let fqdn = Fqdn::new(row.fqdn).map_err(|err| format!("stored record fqdn: {err}"))?;
        let record_type = u16::try_from(row.record_type)
            .map_err(|_| format!("stored record type {} out of range", row.record_type))
            .and_then(|code| RecordType::new(code).map_err(|err| err.to_string()))?;
        let ttl = u32::try_from(row.ttl)
            .map_err(|_| format!("stored ttl {} out of range", row.ttl))
            .and_then(|seconds| Ttl::new(seconds).map_err(|err| err.to_string()))?;
        let data = RecordData::try_new(fqdn, row.content, record_type, ttl)
            .map_err(|err| format!("stored record: {err}"))?;
        Ok(Record::new(
            RecordId::new(row.id),
            DomainId::new(row.domain_id),
            data,
        ))
    }
}

/// Insertable record, also used as the changeset of a replacement.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = records)]
pub(crate) struct RecordValues<'a> {
    pub domain_id: i64,
    pub fqdn: &'a str,
    pub content: &'a str,
    pub record_type: i32,
    pub ttl: i64,
}

impl<'a> RecordValues<'a> {
    pub(crate) fn new(domain_id: DomainId, data: &'a RecordData) -> Self {
        Self {
            domain_id: domain_id.as_i64(),
            fqdn: data.fqdn.as_ref(),
            content: data.content.as_str(),
            record_type: i32::from(data.record_type.code()),
            ttl: i64::from(data.ttl.seconds()),
        }
    }
}

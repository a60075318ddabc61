//! Zone consistency engine: the SOA record and the serial protocol.
//!
//! Every committed change to a zone's record set is followed, inside the same
//! store transaction, by one refresh:
//!
//! 1. the domain serial advances by one (wrapping at `u32::MAX`);
//! 2. the SOA content is rebuilt as
//!    `master.<fqdn> <contact> <YYYYMMDD><serial> <refresh> <retry> <expire> <minimum>`;
//! 3. the record with type SOA and the zone's own name is created or
//!    overwritten in place;
//! 4. the new serial is written back to the domain.
//!
//! This module computes steps 1 and 2. Adapters perform steps 3 and 4 under
//! the domain row lock so concurrent writers cannot lose an increment.

use chrono::NaiveDate;

use super::{Domain, Email, RecordData, RecordType, Serial, Ttl, User};

/// Operator-tunable SOA timers, in seconds.
///
/// # Examples
/// ```
/// use zone_api::domain::SoaPolicy;
///
/// let policy = SoaPolicy::default();
/// assert_eq!(policy.refresh(), 3600);
/// assert_eq!(policy.ttl().seconds(), 3600);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoaPolicy {
    refresh: u32,
    retry: u32,
    expire: u32,
    minimum: u32,
    ttl: Ttl,
}

/// Default SOA refresh interval.
pub const DEFAULT_SOA_REFRESH: u32 = 3600;
/// Default SOA retry interval.
pub const DEFAULT_SOA_RETRY: u32 = 1800;
/// Default SOA expiry.
pub const DEFAULT_SOA_EXPIRE: u32 = 604_800;
/// Default negative-caching TTL.
pub const DEFAULT_SOA_MINIMUM: u32 = 600;

impl SoaPolicy {
    /// Build a policy from explicit timers.
    pub const fn new(refresh: u32, retry: u32, expire: u32, minimum: u32, ttl: Ttl) -> Self {
        Self {
            refresh,
            retry,
            expire,
            minimum,
            ttl,
        }
    }

    /// Seconds between secondary refreshes.
    pub const fn refresh(&self) -> u32 {
        self.refresh
    }

    /// Seconds before a failed refresh is retried.
    pub const fn retry(&self) -> u32 {
        self.retry
    }

    /// Seconds after which secondaries stop answering.
    pub const fn expire(&self) -> u32 {
        self.expire
    }

    /// Negative-caching TTL.
    pub const fn minimum(&self) -> u32 {
        self.minimum
    }

    /// TTL of the SOA record itself.
    pub const fn ttl(&self) -> Ttl {
        self.ttl
    }
}

impl Default for SoaPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_SOA_REFRESH,
            DEFAULT_SOA_RETRY,
            DEFAULT_SOA_EXPIRE,
            DEFAULT_SOA_MINIMUM,
            Ttl::SOA_DEFAULT,
        )
    }
}

/// Encode a mailbox as an SOA responsible-person name.
///
/// Dots in the local part are escaped as `\.`, the `@` becomes a label
/// separator, and the result is made absolute.
///
/// # Examples
/// ```
/// use zone_api::domain::{soa_contact, Email};
///
/// let email = Email::new("first.last@example.org").unwrap();
/// assert_eq!(soa_contact(&email), r"first\.last.example.org.");
/// ```
pub fn soa_contact(email: &Email) -> String {
    let raw = email.as_ref();
    let (local, domain) = raw.split_once('@').unwrap_or((raw, ""));
    let mut contact = local.replace('.', "\\.");
    if !domain.is_empty() {
        contact.push('.');
        contact.push_str(domain);
    }
    if !contact.ends_with('.') {
        contact.push('.');
    }
    contact
}

/// Inputs fixed for one refresh: who acted, on which day, under which timers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoaStamp {
    contact: String,
    date_stamp: String,
    policy: SoaPolicy,
}

impl SoaStamp {
    /// Capture the acting user's contact and the UTC day of the change.
    pub fn new(acting_user: &User, today: NaiveDate, policy: SoaPolicy) -> Self {
        Self {
            contact: soa_contact(acting_user.email()),
            date_stamp: today.format("%Y%m%d").to_string(),
            policy,
        }
    }

    /// Encoded responsible-person name.
    pub fn contact(&self) -> &str {
        self.contact.as_str()
    }

    /// `YYYYMMDD` prefix of the serial field.
    pub fn date_stamp(&self) -> &str {
        self.date_stamp.as_str()
    }

    /// Advance the serial of `domain` and build the matching SOA record.
    pub fn refresh(&self, domain: &Domain) -> SoaRefresh {
        let serial = domain.serial().next();
        let policy = &self.policy;
        let content = format!(
            "master.{fqdn} {contact} {date}{serial} {refresh} {retry} {expire} {minimum}",
            fqdn = domain.fqdn(),
            contact = self.contact,
            date = self.date_stamp,
            refresh = policy.refresh(),
            retry = policy.retry(),
            expire = policy.expire(),
            minimum = policy.minimum(),
        );
        SoaRefresh {
            domain: domain.clone().with_serial(serial),
            soa: RecordData {
                fqdn: domain.fqdn().clone(),
                content,
                record_type: RecordType::SOA,
                ttl: policy.ttl(),
            },
        }
    }
}

/// Result of one refresh: the domain carrying its new serial and the SOA
/// record that must replace the zone's current one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoaRefresh {
    pub domain: Domain,
    pub soa: RecordData,
}

impl SoaRefresh {
    /// Serial written back to the domain.
    pub fn serial(&self) -> Serial {
        self.domain.serial()
    }
}

//! Zone data model: domains and their resource records.
//!
//! A zone is one [`Domain`] plus every [`Record`] whose `domain_id` points at
//! it. Identifiers, a domain's `fqdn` and a record's `domain_id` never change
//! after creation; a domain's `serial` only moves through
//! [`SoaStamp::refresh`](crate::domain::SoaStamp::refresh).

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Fqdn, UserId};

/// Reasons a record payload is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValidationError {
    /// TTL of zero seconds.
    ZeroTtl,
    /// Type code zero.
    ZeroType,
    /// Blank record content.
    EmptyContent,
}

impl fmt::Display for RecordValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroTtl => write!(f, "ttl must be a positive number of seconds"),
            Self::ZeroType => write!(f, "type must be a non-zero resource record type"),
            Self::EmptyContent => write!(f, "content must not be empty"),
        }
    }
}

impl std::error::Error for RecordValidationError {}

/// Store-assigned domain identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DomainId(i64);

impl DomainId {
    /// Wrap a raw identifier.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw identifier value.
    pub const fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Store-assigned record identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(i64);

impl RecordId {
    /// Wrap a raw identifier.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw identifier value.
    pub const fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Numeric resource record type. Only NS and SOA carry meaning here; every
/// other value passes through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordType(u16);

impl RecordType {
    /// Name server.
    pub const NS: Self = Self(2);
    /// Start of authority.
    pub const SOA: Self = Self(6);

    /// Validate a raw type code.
    pub const fn new(code: u16) -> Result<Self, RecordValidationError> {
        if code == 0 {
            return Err(RecordValidationError::ZeroType);
        }
        Ok(Self(code))
    }

    /// Raw type code.
    pub const fn code(self) -> u16 {
        self.0
    }

    /// True for the engine-owned SOA type.
    pub fn is_soa(self) -> bool {
        self == Self::SOA
    }
}

/// Positive time-to-live in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ttl(u32);

impl Ttl {
    /// Default TTL of the engine-managed SOA record.
    pub const SOA_DEFAULT: Self = Self(3600);
    /// Default TTL of the NS records synthesised for a new zone.
    pub const NS_DEFAULT: Self = Self(9600);

    /// Validate a raw TTL.
    pub const fn new(seconds: u32) -> Result<Self, RecordValidationError> {
        if seconds == 0 {
            return Err(RecordValidationError::ZeroTtl);
        }
        Ok(Self(seconds))
    }

    /// Seconds.
    pub const fn seconds(self) -> u32 {
        self.0
    }
}

/// Zone version number. Starts at zero and only ever moves forward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Serial(u32);

impl Serial {
    /// Wrap a stored serial.
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Raw value.
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Following serial; wraps at `u32::MAX` instead of panicking.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Serial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A DNS zone apex owned by one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain {
    id: DomainId,
    owner_id: UserId,
    fqdn: Fqdn,
    description: String,
    serial: Serial,
}

impl Domain {
    /// Assemble a domain from stored parts.
    pub fn new(
        id: DomainId,
        owner_id: UserId,
        fqdn: Fqdn,
        description: impl Into<String>,
        serial: Serial,
    ) -> Self {
        Self {
            id,
            owner_id,
            fqdn,
            description: description.into(),
            serial,
        }
    }

    pub fn id(&self) -> DomainId {
        self.id
    }

    pub fn owner_id(&self) -> UserId {
        self.owner_id
    }

    pub fn fqdn(&self) -> &Fqdn {
        &self.fqdn
    }

    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    pub fn serial(&self) -> Serial {
        self.serial
    }

    /// Apply an update while keeping `id`, `fqdn` and `serial`.
    #[must_use]
    pub fn with_changes(mut self, owner_id: UserId, description: String) -> Self {
        self.owner_id = owner_id;
        self.description = description;
        self
    }

    pub(crate) fn with_serial(mut self, serial: Serial) -> Self {
        self.serial = serial;
        self
    }
}

/// Domain row ready for insertion; the store assigns the identifier and the
/// serial starts at zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDomain {
    pub owner_id: UserId,
    pub fqdn: Fqdn,
    pub description: String,
}

/// Validated create payload for a domain.
///
/// `owner_id` is a request, not a fact: the coordinator normalises it for
/// non-admin callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainDraft {
    pub owner_id: Option<UserId>,
    pub fqdn: Fqdn,
    pub description: String,
}

/// Validated update payload for a domain. Absent fields keep stored values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainChanges {
    pub owner_id: Option<UserId>,
    pub description: Option<String>,
}

/// The user-editable part of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordData {
    pub fqdn: Fqdn,
    pub content: String,
    pub record_type: RecordType,
    pub ttl: Ttl,
}

impl RecordData {
    /// Validate payload parts.
    pub fn try_new(
        fqdn: Fqdn,
        content: impl Into<String>,
        record_type: RecordType,
        ttl: Ttl,
    ) -> Result<Self, RecordValidationError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(RecordValidationError::EmptyContent);
        }
        Ok(Self {
            fqdn,
            content,
            record_type,
            ttl,
        })
    }
}

/// A resource record inside one zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    id: RecordId,
    domain_id: DomainId,
    data: RecordData,
}

impl Record {
    /// Assemble a record from stored parts.
    pub fn new(id: RecordId, domain_id: DomainId, data: RecordData) -> Self {
        Self {
            id,
            domain_id,
            data,
        }
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn domain_id(&self) -> DomainId {
        self.domain_id
    }

    pub fn fqdn(&self) -> &Fqdn {
        &self.data.fqdn
    }

    pub fn content(&self) -> &str {
        self.data.content.as_str()
    }

    pub fn record_type(&self) -> RecordType {
        self.data.record_type
    }

    pub fn ttl(&self) -> Ttl {
        self.data.ttl
    }

    pub fn data(&self) -> &RecordData {
        &self.data
    }

    /// Replace the editable part, keeping `id` and `domain_id`.
    #[must_use]
    pub fn with_data(mut self, data: RecordData) -> Self {
        self.data = data;
        self
    }
}

/// Validated create payload for a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDraft {
    pub domain_id: DomainId,
    pub data: RecordData,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn serial_wraps_instead_of_overflowing() {
        assert_eq!(Serial::new(u32::MAX).next(), Serial::new(0));
        assert_eq!(Serial::default().next(), Serial::new(1));
    }

    #[rstest]
    fn zero_ttl_and_type_are_rejected() {
        assert_eq!(Ttl::new(0), Err(RecordValidationError::ZeroTtl));
        assert_eq!(RecordType::new(0), Err(RecordValidationError::ZeroType));
        assert_eq!(RecordType::new(6), Ok(RecordType::SOA));
    }

    #[rstest]
    fn blank_content_is_rejected() {
        let result = RecordData::try_new(
            Fqdn::new("www.example.org.").expect("fqdn"),
            "  ",
            RecordType::new(1).expect("type"),
            Ttl::new(300).expect("ttl"),
        );
        assert_eq!(result, Err(RecordValidationError::EmptyContent));
    }

    #[rstest]
    fn domain_changes_keep_identity_fqdn_and_serial() {
        let domain = Domain::new(
            DomainId::new(3),
            UserId::new(1),
            Fqdn::new("example.org.").expect("fqdn"),
            "old",
            Serial::new(9),
        );
        let updated = domain.with_changes(UserId::new(2), "new".to_owned());
        assert_eq!(updated.id(), DomainId::new(3));
        assert_eq!(updated.fqdn().as_ref(), "example.org.");
        assert_eq!(updated.serial(), Serial::new(9));
        assert_eq!(updated.owner_id(), UserId::new(2));
        assert_eq!(updated.description(), "new");
    }
}

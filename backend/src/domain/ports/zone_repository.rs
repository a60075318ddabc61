//! Port abstraction for zone persistence: domains, records and the atomic
//! record-change-plus-SOA-refresh unit.
use async_trait::async_trait;
use pagination::PageRequest;

use crate::domain::{
    Domain, DomainId, Fqdn, NewDomain, Record, RecordData, RecordId, SoaStamp, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by zone repository adapters.
    pub enum ZoneRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "zone repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "zone repository query failed: {message}",
        /// A unique constraint on the domain name rejected the write.
        DuplicateFqdn { fqdn: String } => "a domain named {fqdn} already exists",
        /// The domain disappeared before the write could lock it.
        DomainNotFound { id: i64 } => "domain {id} not found",
        /// The record is missing or belongs to another zone.
        RecordNotFound { id: i64 } => "record {id} not found",
    }
}

/// One change to a zone's record set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordMutation {
    /// Insert a new record into the zone.
    Create(RecordData),
    /// Overwrite the editable part of an existing record.
    Update { id: RecordId, data: RecordData },
    /// Remove a record from the zone.
    Delete { id: RecordId },
}

/// State committed by [`ZoneRepository::mutate_zone`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneMutation {
    /// The created or updated record; `None` after a delete.
    pub record: Option<Record>,
    /// The domain carrying its refreshed serial.
    pub domain: Domain,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ZoneRepository: Send + Sync {
    /// Fetch a domain by identifier.
    async fn find_domain(&self, id: DomainId) -> Result<Option<Domain>, ZoneRepositoryError>;

    /// Whether any domain already uses `fqdn`.
    async fn fqdn_exists(&self, fqdn: &Fqdn) -> Result<bool, ZoneRepositoryError>;

    /// List domains ordered by identifier, optionally restricted to one owner.
    async fn list_domains(
        &self,
        owner: Option<UserId>,
        page: PageRequest,
    ) -> Result<Vec<Domain>, ZoneRepositoryError>;

    /// Insert a domain with serial zero together with its initial records.
    ///
    /// Implementations must write the domain and `initial_records` within one
    /// transaction boundary and must not create an SOA record.
    async fn create_domain(
        &self,
        domain: &NewDomain,
        initial_records: &[RecordData],
    ) -> Result<Domain, ZoneRepositoryError>;

    /// Persist the owner and description of an existing domain.
    ///
    /// The stored `fqdn` and `serial` are never written by this call.
    async fn update_domain(&self, domain: &Domain) -> Result<(), ZoneRepositoryError>;

    /// Delete every record of the zone, then the domain itself, atomically.
    /// A zone without records is not an error.
    async fn delete_domain(&self, id: DomainId) -> Result<(), ZoneRepositoryError>;

    /// Fetch a record by identifier.
    async fn find_record(&self, id: RecordId) -> Result<Option<Record>, ZoneRepositoryError>;

    /// List a zone's records ordered by identifier.
    async fn list_records(
        &self,
        domain_id: DomainId,
        page: PageRequest,
    ) -> Result<Vec<Record>, ZoneRepositoryError>;

    /// Apply `mutation` and refresh the zone's SOA.
    ///
    /// Implementations must, within one transaction boundary: lock the domain
    /// row, apply the mutation, compute [`SoaStamp::refresh`] from the locked
    /// row, upsert the SOA record of `(domain_id, fqdn)` and write the new
    /// serial. Either every step commits or none does.
    async fn mutate_zone(
        &self,
        domain_id: DomainId,
        mutation: RecordMutation,
        stamp: &SoaStamp,
    ) -> Result<ZoneMutation, ZoneRepositoryError>;
}

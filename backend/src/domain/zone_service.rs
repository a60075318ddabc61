//! Domain and record coordinator.
//!
//! Each operation follows the same order: payload checks, existence,
//! authorization, containment, then one store call. Record writes go through
//! [`ZoneRepository::mutate_zone`] so the SOA refresh commits with the change.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::PageQuery;
use tracing::{debug, info};

use crate::domain::authorization::{can_access_domain, normalize_owner};
use crate::domain::ports::{
    DomainAdmin, RecordAdmin, RecordMutation, ZoneRepository, ZoneRepositoryError,
};
use crate::domain::{
    Domain, DomainChanges, DomainDraft, DomainId, Error, NewDomain, Record, RecordData,
    RecordDraft, RecordId, RecordType, SoaStamp, User, ZonePolicy,
};

pub(crate) const DOMAIN_NOT_FOUND_MESSAGE: &str = "Domain not found.";
pub(crate) const RECORD_NOT_FOUND_MESSAGE: &str = "Record not found.";
pub(crate) const DOMAIN_FORBIDDEN_MESSAGE: &str = "No access to this domain (no permission).";
pub(crate) const DUPLICATE_FQDN_MESSAGE: &str = "Domain with the same FQDN already exists.";
pub(crate) const CONTAINMENT_MESSAGE: &str =
    "Record FQDN end don't correspond to parent domain FQDN.";
pub(crate) const SOA_MANAGED_MESSAGE: &str = "SOA records are managed by the server.";

/// Coordinator implementing [`DomainAdmin`] and [`RecordAdmin`].
#[derive(Clone)]
pub struct ZoneService<R> {
    repo: Arc<R>,
    policy: ZonePolicy,
    clock: Arc<dyn Clock>,
}

impl<R> ZoneService<R> {
    /// Create a coordinator over `repo`.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use zone_api::domain::{ZonePolicy, ZoneService};
    /// use zone_api::outbound::memory::InMemoryZoneRepository;
    ///
    /// let service = ZoneService::new(
    ///     Arc::new(InMemoryZoneRepository::default()),
    ///     ZonePolicy::default(),
    ///     Arc::new(DefaultClock),
    /// );
    /// # let _ = service;
    /// ```
    pub fn new(repo: Arc<R>, policy: ZonePolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            repo,
            policy,
            clock,
        }
    }

    /// Operator configuration in force.
    pub fn policy(&self) -> &ZonePolicy {
        &self.policy
    }
}

impl<R> ZoneService<R>
where
    R: ZoneRepository,
{
    fn map_repository_error(error: ZoneRepositoryError) -> Error {
        debug!(kind = error.kind(), %error, "zone repository failure");
        match error {
            ZoneRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("zone repository unavailable: {message}"))
            }
            ZoneRepositoryError::Query { message } => {
                Error::internal(format!("zone repository error: {message}"))
            }
            ZoneRepositoryError::DuplicateFqdn { .. } => Error::conflict(DUPLICATE_FQDN_MESSAGE),
            ZoneRepositoryError::DomainNotFound { .. } => Error::not_found(DOMAIN_NOT_FOUND_MESSAGE),
            ZoneRepositoryError::RecordNotFound { .. } => Error::not_found(RECORD_NOT_FOUND_MESSAGE),
        }
    }

    fn stamp(&self, principal: &User) -> SoaStamp {
        SoaStamp::new(principal, self.clock.utc().date_naive(), self.policy.soa())
    }

    fn reject_soa(record_type: RecordType) -> Result<(), Error> {
        if record_type.is_soa() {
            return Err(Error::invalid_request(SOA_MANAGED_MESSAGE));
        }
        Ok(())
    }

    fn ensure_contained(domain: &Domain, data: &RecordData) -> Result<(), Error> {
        if data.fqdn.is_within(domain.fqdn()) {
            Ok(())
        } else {
            Err(Error::invalid_request(CONTAINMENT_MESSAGE))
        }
    }

    async fn load_domain(&self, id: DomainId) -> Result<Domain, Error> {
        self.repo
            .find_domain(id)
            .await
            .map_err(Self::map_repository_error)?
            .ok_or_else(|| Error::not_found(DOMAIN_NOT_FOUND_MESSAGE))
    }

    async fn load_accessible_domain(&self, principal: &User, id: DomainId) -> Result<Domain, Error> {
        let domain = self.load_domain(id).await?;
        if !can_access_domain(principal, &domain) {
            return Err(Error::forbidden(DOMAIN_FORBIDDEN_MESSAGE));
        }
        Ok(domain)
    }

    async fn load_record(&self, id: RecordId) -> Result<Record, Error> {
        self.repo
            .find_record(id)
            .await
            .map_err(Self::map_repository_error)?
            .ok_or_else(|| Error::not_found(RECORD_NOT_FOUND_MESSAGE))
    }

    /// Record plus its parent, both checked for existence and then access.
    async fn load_accessible_record(
        &self,
        principal: &User,
        id: RecordId,
    ) -> Result<(Record, Domain), Error> {
        let record = self.load_record(id).await?;
        let domain = self
            .load_accessible_domain(principal, record.domain_id())
            .await?;
        Ok((record, domain))
    }

    async fn apply(
        &self,
        principal: &User,
        domain: &Domain,
        mutation: RecordMutation,
    ) -> Result<Option<Record>, Error> {
        let stamp = self.stamp(principal);
        let outcome = self
            .repo
            .mutate_zone(domain.id(), mutation, &stamp)
            .await
            .map_err(Self::map_repository_error)?;
        info!(
            domain_id = %outcome.domain.id(),
            serial = %outcome.domain.serial(),
            "zone serial advanced"
        );
        Ok(outcome.record)
    }

    fn nameserver_records(&self, draft: &DomainDraft) -> Vec<RecordData> {
        self.policy
            .nameservers()
            .iter()
            .map(|ns| RecordData {
                fqdn: draft.fqdn.clone(),
                content: ns.to_string(),
                record_type: RecordType::NS,
                ttl: self.policy.ns_ttl(),
            })
            .collect()
    }
}

#[async_trait]
impl<R> DomainAdmin for ZoneService<R>
where
    R: ZoneRepository,
{
    async fn list_domains(
        &self,
        principal: &User,
        page: PageQuery,
    ) -> Result<Vec<Domain>, Error> {
        let owner = if principal.is_admin() {
            None
        } else {
            Some(principal.id())
        };
        let page = page.resolve(self.policy.page_bounds());
        self.repo
            .list_domains(owner, page)
            .await
            .map_err(Self::map_repository_error)
    }

    async fn get_domain(&self, principal: &User, id: DomainId) -> Result<Domain, Error> {
        self.load_accessible_domain(principal, id).await
    }

    async fn create_domain(&self, principal: &User, draft: DomainDraft) -> Result<Domain, Error> {
        let owner_id = normalize_owner(principal, draft.owner_id, principal.id());
        if self
            .repo
            .fqdn_exists(&draft.fqdn)
            .await
            .map_err(Self::map_repository_error)?
        {
            return Err(Error::conflict(DUPLICATE_FQDN_MESSAGE));
        }

        let nameservers = self.nameserver_records(&draft);
        let new_domain = NewDomain {
            owner_id,
            fqdn: draft.fqdn,
            description: draft.description,
        };
        let domain = self
            .repo
            .create_domain(&new_domain, &nameservers)
            .await
            .map_err(Self::map_repository_error)?;
        info!(
            domain_id = %domain.id(),
            fqdn = %domain.fqdn(),
            nameservers = nameservers.len(),
            "domain created"
        );
        Ok(domain)
    }

    async fn update_domain(
        &self,
        principal: &User,
        id: DomainId,
        changes: DomainChanges,
    ) -> Result<Domain, Error> {
        let domain = self.load_accessible_domain(principal, id).await?;
        let owner_id = normalize_owner(principal, changes.owner_id, domain.owner_id());
        let description = changes
            .description
            .unwrap_or_else(|| domain.description().to_owned());
        let updated = domain.with_changes(owner_id, description);
        self.repo
            .update_domain(&updated)
            .await
            .map_err(Self::map_repository_error)?;
        Ok(updated)
    }

    async fn delete_domain(&self, principal: &User, id: DomainId) -> Result<(), Error> {
        let domain = self.load_accessible_domain(principal, id).await?;
        self.repo
            .delete_domain(domain.id())
            .await
            .map_err(Self::map_repository_error)?;
        debug!(domain_id = %domain.id(), "domain deleted with its records");
        Ok(())
    }

    async fn list_records(
        &self,
        principal: &User,
        id: DomainId,
        page: PageQuery,
    ) -> Result<Vec<Record>, Error> {
        let domain = self.load_accessible_domain(principal, id).await?;
        let page = page.resolve(self.policy.page_bounds());
        self.repo
            .list_records(domain.id(), page)
            .await
            .map_err(Self::map_repository_error)
    }
}

#[async_trait]
impl<R> RecordAdmin for ZoneService<R>
where
    R: ZoneRepository,
{
    async fn get_record(&self, principal: &User, id: RecordId) -> Result<Record, Error> {
        let (record, _) = self.load_accessible_record(principal, id).await?;
        Ok(record)
    }

    async fn create_record(&self, principal: &User, draft: RecordDraft) -> Result<Record, Error> {
        Self::reject_soa(draft.data.record_type)?;
        let domain = self.load_accessible_domain(principal, draft.domain_id).await?;
        Self::ensure_contained(&domain, &draft.data)?;
        self.apply(principal, &domain, RecordMutation::Create(draft.data))
            .await?
            .ok_or_else(|| Error::internal("zone store returned no record for a create"))
    }

    async fn update_record(
        &self,
        principal: &User,
        id: RecordId,
        data: RecordData,
    ) -> Result<Record, Error> {
        Self::reject_soa(data.record_type)?;
        let (record, domain) = self.load_accessible_record(principal, id).await?;
        Self::reject_soa(record.record_type())?;
        Self::ensure_contained(&domain, &data)?;
        self.apply(principal, &domain, RecordMutation::Update { id, data })
            .await?
            .ok_or_else(|| Error::internal("zone store returned no record for an update"))
    }

    async fn delete_record(&self, principal: &User, id: RecordId) -> Result<(), Error> {
        let (record, domain) = self.load_accessible_record(principal, id).await?;
        Self::reject_soa(record.record_type())?;
        self.apply(principal, &domain, RecordMutation::Delete { id })
            .await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "zone_service_tests.rs"]
mod tests;

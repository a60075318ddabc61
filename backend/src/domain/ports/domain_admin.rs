//! Driving port for domain (zone apex) use-cases.
//!
//! Every operation takes the acting principal explicitly; adapters resolve
//! it from the request credential before calling in.

use async_trait::async_trait;
use pagination::PageQuery;

use crate::domain::{Domain, DomainChanges, DomainDraft, DomainId, Error, Record, User};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DomainAdmin: Send + Sync {
    /// Domains visible to `principal`: all of them for admins, owned ones
    /// otherwise.
    async fn list_domains(&self, principal: &User, page: PageQuery)
    -> Result<Vec<Domain>, Error>;

    /// One domain, `404` when missing, `403` when foreign.
    async fn get_domain(&self, principal: &User, id: DomainId) -> Result<Domain, Error>;

    /// Create a zone and its NS records.
    async fn create_domain(&self, principal: &User, draft: DomainDraft) -> Result<Domain, Error>;

    /// Update owner and description; `id`, `fqdn` and `serial` are kept.
    async fn update_domain(
        &self,
        principal: &User,
        id: DomainId,
        changes: DomainChanges,
    ) -> Result<Domain, Error>;

    /// Delete a zone and all of its records.
    async fn delete_domain(&self, principal: &User, id: DomainId) -> Result<(), Error>;

    /// Records of one zone.
    async fn list_records(
        &self,
        principal: &User,
        id: DomainId,
        page: PageQuery,
    ) -> Result<Vec<Record>, Error>;
}

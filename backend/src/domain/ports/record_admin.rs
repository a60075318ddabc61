//! Driving port for record use-cases. Every mutation refreshes the zone SOA.

use async_trait::async_trait;

use crate::domain::{Error, Record, RecordData, RecordDraft, RecordId, User};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordAdmin: Send + Sync {
    /// One record, gated by access to its parent domain.
    async fn get_record(&self, principal: &User, id: RecordId) -> Result<Record, Error>;

    /// Add a record to a zone.
    async fn create_record(&self, principal: &User, draft: RecordDraft) -> Result<Record, Error>;

    /// Replace a record's editable part; `id` and `domain_id` are kept.
    async fn update_record(
        &self,
        principal: &User,
        id: RecordId,
        data: RecordData,
    ) -> Result<Record, Error>;

    /// Remove a record from its zone.
    async fn delete_record(&self, principal: &User, id: RecordId) -> Result<(), Error>;
}

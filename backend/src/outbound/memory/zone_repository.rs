//! In-process zone store.
//!
//! One mutex guards every domain and record, so `mutate_zone` sees and
//! commits a zone exactly like a locked database transaction would.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use pagination::PageRequest;

use crate::domain::ports::{RecordMutation, ZoneMutation, ZoneRepository, ZoneRepositoryError};
use crate::domain::{
    Domain, DomainId, Fqdn, NewDomain, Record, RecordData, RecordId, Serial, SoaStamp, UserId,
};

#[derive(Debug, Default)]
struct ZoneState {
    last_domain_id: i64,
    last_record_id: i64,
    domains: BTreeMap<DomainId, Domain>,
    records: BTreeMap<RecordId, Record>,
}

impl ZoneState {
    fn next_record_id(&mut self) -> RecordId {
        self.last_record_id += 1;
        RecordId::new(self.last_record_id)
    }

    fn insert_record(&mut self, domain_id: DomainId, data: RecordData) -> Record {
        let record = Record::new(self.next_record_id(), domain_id, data);
        self.records.insert(record.id(), record.clone());
        record
    }

    fn zone_record(&self, domain_id: DomainId, id: RecordId) -> Result<&Record, ZoneRepositoryError> {
        self.records
            .get(&id)
            .filter(|record| record.domain_id() == domain_id)
            .ok_or_else(|| ZoneRepositoryError::record_not_found(id.as_i64()))
    }

    fn soa_of(&self, domain_id: DomainId) -> Option<RecordId> {
        self.records
            .values()
            .find(|record| record.domain_id() == domain_id && record.record_type().is_soa())
            .map(Record::id)
    }
}

/// Zone repository kept in process memory; state is lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryZoneRepository {
    state: Mutex<ZoneState>,
}

impl InMemoryZoneRepository {
    fn lock(&self) -> Result<MutexGuard<'_, ZoneState>, ZoneRepositoryError> {
        self.state
            .lock()
            .map_err(|_| ZoneRepositoryError::query("zone store lock poisoned"))
    }
}

#[async_trait]
impl ZoneRepository for InMemoryZoneRepository {
    async fn find_domain(&self, id: DomainId) -> Result<Option<Domain>, ZoneRepositoryError> {
        Ok(self.lock()?.domains.get(&id).cloned())
    }

    async fn fqdn_exists(&self, fqdn: &Fqdn) -> Result<bool, ZoneRepositoryError> {
        Ok(self
            .lock()?
            .domains
            .values()
            .any(|domain| domain.fqdn() == fqdn))
    }

    async fn list_domains(
        &self,
        owner: Option<UserId>,
        page: PageRequest,
    ) -> Result<Vec<Domain>, ZoneRepositoryError> {
        let state = self.lock()?;
        let visible = state
            .domains
            .values()
            .filter(|domain| owner.is_none_or(|owner| domain.owner_id() == owner))
            .cloned();
        Ok(page.take_page(visible))
    }

    async fn create_domain(
        &self,
        domain: &NewDomain,
        initial_records: &[RecordData],
    ) -> Result<Domain, ZoneRepositoryError> {
        let mut state = self.lock()?;
        if state.domains.values().any(|existing| existing.fqdn() == &domain.fqdn) {
            return Err(ZoneRepositoryError::duplicate_fqdn(domain.fqdn.to_string()));
        }
        state.last_domain_id += 1;
        let created = Domain::new(
            DomainId::new(state.last_domain_id),
            domain.owner_id,
            domain.fqdn.clone(),
            domain.description.clone(),
            Serial::default(),
        );
        state.domains.insert(created.id(), created.clone());
        for data in initial_records {
            state.insert_record(created.id(), data.clone());
        }
        Ok(created)
    }

    async fn update_domain(&self, domain: &Domain) -> Result<(), ZoneRepositoryError> {
        let mut state = self.lock()?;
        let stored = state
            .domains
            .get_mut(&domain.id())
            .ok_or_else(|| ZoneRepositoryError::domain_not_found(domain.id().as_i64()))?;
        *stored = stored
            .clone()
            .with_changes(domain.owner_id(), domain.description().to_owned());
        Ok(())
    }

    async fn delete_domain(&self, id: DomainId) -> Result<(), ZoneRepositoryError> {
        let mut state = self.lock()?;
        if !state.domains.contains_key(&id) {
            return Err(ZoneRepositoryError::domain_not_found(id.as_i64()));
        }
        state.records.retain(|_, record| record.domain_id() != id);
        state.domains.remove(&id);
        Ok(())
    }

    async fn find_record(&self, id: RecordId) -> Result<Option<Record>, ZoneRepositoryError> {
        Ok(self.lock()?.records.get(&id).cloned())
    }

    async fn list_records(
        &self,
        domain_id: DomainId,
        page: PageRequest,
    ) -> Result<Vec<Record>, ZoneRepositoryError> {
        let state = self.lock()?;
        let zone = state
            .records
            .values()
            .filter(|record| record.domain_id() == domain_id)
            .cloned();
        Ok(page.take_page(zone))
    }

    async fn mutate_zone(
        &self,
        domain_id: DomainId,
        mutation: RecordMutation,
        stamp: &SoaStamp,
    ) -> Result<ZoneMutation, ZoneRepositoryError> {
        let mut state = self.lock()?;
        let domain = state
            .domains
            .get(&domain_id)
            .cloned()
            .ok_or_else(|| ZoneRepositoryError::domain_not_found(domain_id.as_i64()))?;

        // Validate before writing so a failure leaves the zone untouched.
        if let RecordMutation::Update { id, .. } | RecordMutation::Delete { id } = &mutation {
            state.zone_record(domain_id, *id)?;
        }

        let record = match mutation {
            RecordMutation::Create(data) => Some(state.insert_record(domain_id, data)),
            RecordMutation::Update { id, data } => {
                let updated = state.zone_record(domain_id, id)?.clone().with_data(data);
                state.records.insert(id, updated.clone());
                Some(updated)
            }
            RecordMutation::Delete { id } => {
                state.records.remove(&id);
                None
            }
        };

        let refresh = stamp.refresh(&domain);
        match state.soa_of(domain_id) {
            Some(soa_id) => {
                let soa = Record::new(soa_id, domain_id, refresh.soa);
                state.records.insert(soa_id, soa);
            }
            None => {
                state.insert_record(domain_id, refresh.soa);
            }
        }
        state.domains.insert(domain_id, refresh.domain.clone());

        Ok(ZoneMutation {
            record,
            domain: refresh.domain,
        })
    }
}

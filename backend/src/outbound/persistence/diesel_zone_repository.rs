//! PostgreSQL-backed `ZoneRepository`.
//!
//! Every zone write that touches records runs in one transaction that first
//! takes `SELECT ... FOR UPDATE` on the domain row. Concurrent writers to the
//! same zone therefore queue on that lock and each observes the serial the
//! previous one committed.

use async_trait::async_trait;
use diesel::OptionalExtension as _;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};
use pagination::PageRequest;

use crate::domain::ports::{RecordMutation, ZoneMutation, ZoneRepository, ZoneRepositoryError};
use crate::domain::{
    Domain, DomainId, Fqdn, NewDomain, Record, RecordData, RecordId, RecordType, SoaStamp,
    UserId,
};

use super::diesel_error_mapping::{StoreFailure, classify_diesel_error, classify_pool_error};
use super::models::{DomainRow, NewDomainRow, RecordRow, RecordValues};
use super::pool::{DbPool, PoolError};
use super::schema::{domains, records};

fn soa_code() -> i32 {
    i32::from(RecordType::SOA.code())
}

/// Diesel-backed zone store.
#[derive(Clone)]
pub struct DieselZoneRepository {
    pool: DbPool,
}

impl DieselZoneRepository {
    /// Wrap a connection pool.
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Failure inside a transaction: either a statement failed or the zone
/// itself ruled the write out.
#[derive(Debug)]
enum ZoneTxError {
    Store(DieselError),
    Rejected(ZoneRepositoryError),
}

impl From<DieselError> for ZoneTxError {
    fn from(error: DieselError) -> Self {
        Self::Store(error)
    }
}

impl From<ZoneTxError> for ZoneRepositoryError {
    fn from(error: ZoneTxError) -> Self {
        match error {
            ZoneTxError::Store(error) => map_diesel_error(error),
            ZoneTxError::Rejected(error) => error,
        }
    }
}

fn map_failure(failure: StoreFailure) -> ZoneRepositoryError {
    match failure {
        StoreFailure::Connection(message) => ZoneRepositoryError::connection(message),
        StoreFailure::UniqueViolation { constraint } => ZoneRepositoryError::query(format!(
            "unique constraint violated: {}",
            constraint.as_deref().unwrap_or("unknown")
        )),
        StoreFailure::Query(message) => ZoneRepositoryError::query(message),
    }
}

fn map_pool_error(error: PoolError) -> ZoneRepositoryError {
    map_failure(classify_pool_error(error))
}

fn map_diesel_error(error: DieselError) -> ZoneRepositoryError {
    map_failure(classify_diesel_error(error))
}

fn to_domain(row: DomainRow) -> Result<Domain, ZoneRepositoryError> {
    Domain::try_from(row).map_err(ZoneRepositoryError::query)
}

fn to_record(row: RecordRow) -> Result<Record, ZoneRepositoryError> {
    Record::try_from(row).map_err(ZoneRepositoryError::query)
}

fn serial_column(domain: &Domain) -> i64 {
    i64::from(domain.serial().value())
}

/// Apply one record change inside the zone's transaction.
///
/// Update and delete filter on both the record id and the zone so a record
/// of another zone reads as missing.
async fn apply_mutation(
    conn: &mut AsyncPgConnection,
    domain_id: DomainId,
    mutation: &RecordMutation,
) -> Result<Option<Record>, ZoneTxError> {
    let zone = domain_id.as_i64();
    match mutation {
        RecordMutation::Create(data) => {
            let row = diesel::insert_into(records::table)
                .values(RecordValues::new(domain_id, data))
                .returning(RecordRow::as_returning())
                .get_result(conn)
                .await?;
            to_record(row).map(Some).map_err(ZoneTxError::Rejected)
        }
        RecordMutation::Update { id, data } => {
            let row = diesel::update(
                records::table
                    .filter(records::id.eq(id.as_i64()))
                    .filter(records::domain_id.eq(zone)),
            )
            .set(RecordValues::new(domain_id, data))
            .returning(RecordRow::as_returning())
            .get_result(conn)
            .await
            .optional()?
            .ok_or_else(|| record_missing(*id))?;
            to_record(row).map(Some).map_err(ZoneTxError::Rejected)
        }
        RecordMutation::Delete { id } => {
            let deleted = diesel::delete(
                records::table
                    .filter(records::id.eq(id.as_i64()))
                    .filter(records::domain_id.eq(zone)),
            )
            .execute(conn)
            .await?;
            if deleted == 0 {
                return Err(record_missing(*id));
            }
            Ok(None)
        }
    }
}

fn record_missing(id: RecordId) -> ZoneTxError {
    ZoneTxError::Rejected(ZoneRepositoryError::record_not_found(id.as_i64()))
}

/// Overwrite the zone's SOA row, inserting it when the zone has none yet.
async fn upsert_soa(
    conn: &mut AsyncPgConnection,
    domain_id: DomainId,
    soa: &RecordData,
) -> Result<(), ZoneTxError> {
    let values = RecordValues::new(domain_id, soa);
    let updated = diesel::update(
        records::table
            .filter(records::domain_id.eq(domain_id.as_i64()))
            .filter(records::record_type.eq(soa_code())),
    )
    .set(&values)
    .execute(conn)
    .await?;
    if updated == 0 {
        diesel::insert_into(records::table)
            .values(&values)
            .execute(conn)
            .await?;
    }
    Ok(())
}

#[async_trait]
impl ZoneRepository for DieselZoneRepository {
    async fn find_domain(&self, id: DomainId) -> Result<Option<Domain>, ZoneRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        domains::table
            .find(id.as_i64())
            .select(DomainRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(to_domain)
            .transpose()
    }

    async fn fqdn_exists(&self, fqdn: &Fqdn) -> Result<bool, ZoneRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            domains::table.filter(domains::fqdn.eq(fqdn.as_ref())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn list_domains(
        &self,
        owner: Option<UserId>,
        page: PageRequest,
    ) -> Result<Vec<Domain>, ZoneRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = domains::table
            .select(DomainRow::as_select())
            .order(domains::id.asc())
            .into_boxed();
        if let Some(owner) = owner {
            query = query.filter(domains::owner_id.eq(owner.as_i64()));
        }
        let rows: Vec<DomainRow> = query
            .offset(page.sql_offset())
            .limit(page.sql_limit())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(to_domain).collect()
    }

    async fn create_domain(
        &self,
        domain: &NewDomain,
        initial_records: &[RecordData],
    ) -> Result<Domain, ZoneRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let result = conn
            .transaction::<_, DieselError, _>(|conn| {
                async move {
                    let row = diesel::insert_into(domains::table)
                        .values(NewDomainRow::from(domain))
                        .returning(DomainRow::as_returning())
                        .get_result(conn)
                        .await?;
                    let domain_id = DomainId::new(row.id);
                    let values: Vec<RecordValues<'_>> = initial_records
                        .iter()
                        .map(|data| RecordValues::new(domain_id, data))
                        .collect();
                    if !values.is_empty() {
                        diesel::insert_into(records::table)
                            .values(&values)
                            .execute(conn)
                            .await?;
                    }
                    Ok(row)
                }
                .scope_boxed()
            })
            .await;

        match result {
            Ok(row) => to_domain(row),
            Err(error) => match classify_diesel_error(error) {
                failure if failure.violates("fqdn") => {
                    Err(ZoneRepositoryError::duplicate_fqdn(domain.fqdn.as_ref()))
                }
                failure => Err(map_failure(failure)),
            },
        }
    }

    async fn update_domain(&self, domain: &Domain) -> Result<(), ZoneRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(domains::table.find(domain.id().as_i64()))
            .set((
                domains::owner_id.eq(domain.owner_id().as_i64()),
                domains::description.eq(domain.description()),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(ZoneRepositoryError::domain_not_found(domain.id().as_i64()));
        }
        Ok(())
    }

    async fn delete_domain(&self, id: DomainId) -> Result<(), ZoneRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction::<_, ZoneTxError, _>(|conn| {
            async move {
                diesel::delete(records::table.filter(records::domain_id.eq(id.as_i64())))
                    .execute(conn)
                    .await?;
                let deleted = diesel::delete(domains::table.find(id.as_i64()))
                    .execute(conn)
                    .await?;
                if deleted == 0 {
                    return Err(ZoneTxError::Rejected(ZoneRepositoryError::domain_not_found(
                        id.as_i64(),
                    )));
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(ZoneRepositoryError::from)
    }

    async fn find_record(&self, id: RecordId) -> Result<Option<Record>, ZoneRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        records::table
            .find(id.as_i64())
            .select(RecordRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(to_record)
            .transpose()
    }

    async fn list_records(
        &self,
        domain_id: DomainId,
        page: PageRequest,
    ) -> Result<Vec<Record>, ZoneRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<RecordRow> = records::table
            .filter(records::domain_id.eq(domain_id.as_i64()))
            .select(RecordRow::as_select())
            .order(records::id.asc())
            .offset(page.sql_offset())
            .limit(page.sql_limit())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(to_record).collect()
    }

    async fn mutate_zone(
        &self,
        domain_id: DomainId,
        mutation: RecordMutation,
        stamp: &SoaStamp,
    ) -> Result<ZoneMutation, ZoneRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction::<_, ZoneTxError, _>(|conn| {
            async move {
                let locked = domains::table
                    .find(domain_id.as_i64())
                    .select(DomainRow::as_select())
                    .for_update()
                    .get_result(conn)
                    .await
                    .optional()?
                    .ok_or_else(|| {
                        ZoneTxError::Rejected(ZoneRepositoryError::domain_not_found(
                            domain_id.as_i64(),
                        ))
                    })?;
                let domain = to_domain(locked).map_err(ZoneTxError::Rejected)?;

                let record = apply_mutation(conn, domain_id, &mutation).await?;

                let refresh = stamp.refresh(&domain);
                upsert_soa(conn, domain_id, &refresh.soa).await?;
                diesel::update(domains::table.find(domain_id.as_i64()))
                    .set(domains::serial.eq(serial_column(&refresh.domain)))
                    .execute(conn)
                    .await?;

                Ok(ZoneMutation {
                    record,
                    domain: refresh.domain,
                })
            }
            .scope_boxed()
        })
        .await
        .map_err(ZoneRepositoryError::from)
    }
}

//! Resource record HTTP handlers.
//!
//! ```text
//! POST   /record {"domainId":1,"fqdn":"www.example.org.","content":"192.0.2.1","type":1,"ttl":300}
//! GET    /record/{id}
//! PUT    /record/{id}
//! DELETE /record/{id}
//! ```
//!
//! Every successful write advances the parent zone's serial; see
//! [`RecordAdmin`](crate::domain::ports::RecordAdmin).

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{DomainId, Error, Fqdn, Record, RecordData, RecordDraft, RecordType, Ttl};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Principal;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, map_fqdn_error, map_record_error, parse_record_id, require,
};

/// Record as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordBody {
    #[schema(example = 12)]
    pub id: i64,
    #[schema(example = 1)]
    pub domain_id: i64,
    #[schema(example = "www.example.org.")]
    pub fqdn: String,
    #[schema(example = "192.0.2.1")]
    pub content: String,
    /// Numeric resource record type (1 = A, 2 = NS, 6 = SOA, ...).
    #[serde(rename = "type")]
    #[schema(example = 1)]
    pub record_type: u16,
    #[schema(example = 300)]
    pub ttl: u32,
}

impl From<Record> for RecordBody {
    fn from(value: Record) -> Self {
        Self {
            id: value.id().as_i64(),
            domain_id: value.domain_id().as_i64(),
            fqdn: value.fqdn().to_string(),
            content: value.content().to_owned(),
            record_type: value.record_type().code(),
            ttl: value.ttl().seconds(),
        }
    }
}

/// Create and update payload for a record.
///
/// Every field is required on create. On update `domainId` is ignored and
/// absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordPayload {
    pub domain_id: Option<i64>,
    #[schema(example = "www.example.org.")]
    pub fqdn: Option<String>,
    pub content: Option<String>,
    #[serde(rename = "type")]
    pub record_type: Option<u16>,
    pub ttl: Option<u32>,
}

fn parse_record_data(payload: RecordPayload) -> Result<RecordData, Error> {
    let fqdn_field = FieldName::new("fqdn");
    let type_field = FieldName::new("type");
    let ttl_field = FieldName::new("ttl");
    let content_field = FieldName::new("content");

    let fqdn = Fqdn::new(require(payload.fqdn, fqdn_field)?)
        .map_err(|err| map_fqdn_error(fqdn_field, &err))?;
    let record_type = RecordType::new(require(payload.record_type, type_field)?)
        .map_err(|err| map_record_error(type_field, &err))?;
    let ttl = Ttl::new(require(payload.ttl, ttl_field)?)
        .map_err(|err| map_record_error(ttl_field, &err))?;
    let content = require(payload.content, content_field)?;
    RecordData::try_new(fqdn, content, record_type, ttl)
        .map_err(|err| map_record_error(content_field, &err))
}

fn merge_record_changes(current: &Record, payload: RecordPayload) -> Result<RecordData, Error> {
    parse_record_data(RecordPayload {
        domain_id: None,
        fqdn: payload.fqdn.or_else(|| Some(current.fqdn().to_string())),
        content: payload.content.or_else(|| Some(current.content().to_owned())),
        record_type: payload.record_type.or(Some(current.record_type().code())),
        ttl: payload.ttl.or(Some(current.ttl().seconds())),
    })
}

fn parse_record_draft(payload: RecordPayload) -> Result<RecordDraft, Error> {
    let domain_id = require(payload.domain_id, FieldName::new("domainId"))?;
    Ok(RecordDraft {
        domain_id: DomainId::new(domain_id),
        data: parse_record_data(payload)?,
    })
}

/// Add a record to a zone the caller may edit.
///
/// The name must lie within the parent zone; the zone's SOA is refreshed in
/// the same transaction.
#[utoipa::path(
    post,
    path = "/record",
    request_body = RecordPayload,
    responses(
        (status = 200, description = "Record created", body = RecordBody),
        (status = 400, description = "Invalid request or name outside the zone", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Parent domain not found", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["records"],
    operation_id = "createRecord",
    security(("AccessToken" = []))
)]
#[post("/record")]
pub async fn create_record(
    state: web::Data<HttpState>,
    principal: Principal,
    payload: web::Json<RecordPayload>,
) -> ApiResult<web::Json<RecordBody>> {
    let draft = parse_record_draft(payload.into_inner())?;
    let record = state.records.create_record(&principal, draft).await?;
    Ok(web::Json(RecordBody::from(record)))
}

/// Fetch one record.
#[utoipa::path(
    get,
    path = "/record/{id}",
    params(("id" = i64, Path, description = "Record identifier")),
    responses(
        (status = 200, description = "Record", body = RecordBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["records"],
    operation_id = "getRecord",
    security(("AccessToken" = []))
)]
#[get("/record/{id}")]
pub async fn get_record(
    state: web::Data<HttpState>,
    principal: Principal,
    path: web::Path<String>,
) -> ApiResult<web::Json<RecordBody>> {
    let id = parse_record_id(&path)?;
    let record = state.records.get_record(&principal, id).await?;
    Ok(web::Json(RecordBody::from(record)))
}

/// Change a record's name, content, type or TTL.
///
/// Fields left out of the payload keep their current value.
#[utoipa::path(
    put,
    path = "/record/{id}",
    params(("id" = i64, Path, description = "Record identifier")),
    request_body = RecordPayload,
    responses(
        (status = 204, description = "Record updated"),
        (status = 400, description = "Invalid request or name outside the zone", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["records"],
    operation_id = "updateRecord",
    security(("AccessToken" = []))
)]
#[put("/record/{id}")]
pub async fn update_record(
    state: web::Data<HttpState>,
    principal: Principal,
    path: web::Path<String>,
    payload: web::Json<RecordPayload>,
) -> ApiResult<HttpResponse> {
    let id = parse_record_id(&path)?;
    let current = state.records.get_record(&principal, id).await?;
    let data = merge_record_changes(&current, payload.into_inner())?;
    state.records.update_record(&principal, id, data).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Remove a record.
#[utoipa::path(
    delete,
    path = "/record/{id}",
    params(("id" = i64, Path, description = "Record identifier")),
    responses(
        (status = 204, description = "Record deleted"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["records"],
    operation_id = "deleteRecord",
    security(("AccessToken" = []))
)]
#[delete("/record/{id}")]
pub async fn delete_record(
    state: web::Data<HttpState>,
    principal: Principal,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_record_id(&path)?;
    state.records.delete_record(&principal, id).await?;
    Ok(HttpResponse::NoContent().finish())
}

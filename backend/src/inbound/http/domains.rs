//! Domain (zone apex) HTTP handlers.
//!
//! ```text
//! GET    /domains?count=&start=
//! POST   /domain {"fqdn":"example.org.","description":"main zone"}
//! GET    /domain/{id}
//! PUT    /domain/{id} {"ownerId":2,"description":"moved"}
//! DELETE /domain/{id}
//! GET    /domain/{id}/records?count=&start=
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use pagination::PageQuery;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Domain, DomainChanges, DomainDraft, Error, Fqdn, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Principal;
use crate::inbound::http::records::RecordBody;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, map_fqdn_error, parse_domain_id, require};

/// Domain as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DomainBody {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = 1)]
    pub owner_id: i64,
    #[schema(example = "example.org.")]
    pub fqdn: String,
    pub description: String,
    #[schema(example = 0)]
    pub serial: u32,
}

impl From<Domain> for DomainBody {
    fn from(value: Domain) -> Self {
        Self {
            id: value.id().as_i64(),
            owner_id: value.owner_id().as_i64(),
            fqdn: value.fqdn().to_string(),
            description: value.description().to_owned(),
            serial: value.serial().value(),
        }
    }
}

/// Create and update payload for a domain.
///
/// `fqdn` is required on create and ignored on update; `id` and `serial`
/// are never read from clients.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DomainPayload {
    pub owner_id: Option<i64>,
    #[schema(example = "example.org.")]
    pub fqdn: Option<String>,
    pub description: Option<String>,
}

fn parse_domain_draft(payload: DomainPayload) -> Result<DomainDraft, Error> {
    let field = FieldName::new("fqdn");
    let raw = require(payload.fqdn, field)?;
    let fqdn = Fqdn::new(raw).map_err(|err| map_fqdn_error(field, &err))?;
    Ok(DomainDraft {
        owner_id: payload.owner_id.map(UserId::new),
        fqdn,
        description: payload.description.unwrap_or_default(),
    })
}

fn parse_domain_changes(payload: DomainPayload) -> DomainChanges {
    DomainChanges {
        owner_id: payload.owner_id.map(UserId::new),
        description: payload.description,
    }
}

/// List the domains visible to the caller.
#[utoipa::path(
    get,
    path = "/domains",
    params(
        ("count" = Option<i64>, Query, description = "Page size; clamped to the configured maximum"),
        ("start" = Option<i64>, Query, description = "Zero-based offset")
    ),
    responses(
        (status = 200, description = "Domains", body = [DomainBody]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["domains"],
    operation_id = "listDomains",
    security(("AccessToken" = []))
)]
#[get("/domains")]
pub async fn list_domains(
    state: web::Data<HttpState>,
    principal: Principal,
    page: web::Query<PageQuery>,
) -> ApiResult<web::Json<Vec<DomainBody>>> {
    let domains = state
        .domains
        .list_domains(&principal, page.into_inner())
        .await?;
    Ok(web::Json(domains.into_iter().map(DomainBody::from).collect()))
}

/// Create a zone and its nameserver records.
///
/// # Examples
/// ```no_run
/// use actix_web::web;
/// use zone_api::inbound::http::ApiResult;
/// use zone_api::inbound::http::auth::Principal;
/// use zone_api::inbound::http::domains::{DomainBody, DomainPayload, create_domain};
/// use zone_api::inbound::http::state::HttpState;
///
/// async fn call_handler(
///     state: web::Data<HttpState>,
///     principal: Principal,
/// ) -> ApiResult<web::Json<DomainBody>> {
///     let payload = web::Json(DomainPayload {
///         fqdn: Some("example.org.".to_owned()),
///         ..DomainPayload::default()
///     });
///     create_domain(state, principal, payload).await
/// }
/// ```
#[utoipa::path(
    post,
    path = "/domain",
    request_body = DomainPayload,
    responses(
        (status = 200, description = "Domain created", body = DomainBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 409, description = "Domain already exists", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["domains"],
    operation_id = "createDomain",
    security(("AccessToken" = []))
)]
#[post("/domain")]
pub async fn create_domain(
    state: web::Data<HttpState>,
    principal: Principal,
    payload: web::Json<DomainPayload>,
) -> ApiResult<web::Json<DomainBody>> {
    let draft = parse_domain_draft(payload.into_inner())?;
    let domain = state.domains.create_domain(&principal, draft).await?;
    Ok(web::Json(DomainBody::from(domain)))
}

/// Fetch one domain.
#[utoipa::path(
    get,
    path = "/domain/{id}",
    params(("id" = i64, Path, description = "Domain identifier")),
    responses(
        (status = 200, description = "Domain", body = DomainBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["domains"],
    operation_id = "getDomain",
    security(("AccessToken" = []))
)]
#[get("/domain/{id}")]
pub async fn get_domain(
    state: web::Data<HttpState>,
    principal: Principal,
    path: web::Path<String>,
) -> ApiResult<web::Json<DomainBody>> {
    let id = parse_domain_id(&path)?;
    let domain = state.domains.get_domain(&principal, id).await?;
    Ok(web::Json(DomainBody::from(domain)))
}

/// Change a domain's owner or description.
#[utoipa::path(
    put,
    path = "/domain/{id}",
    params(("id" = i64, Path, description = "Domain identifier")),
    request_body = DomainPayload,
    responses(
        (status = 204, description = "Domain updated"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["domains"],
    operation_id = "updateDomain",
    security(("AccessToken" = []))
)]
#[put("/domain/{id}")]
pub async fn update_domain(
    state: web::Data<HttpState>,
    principal: Principal,
    path: web::Path<String>,
    payload: web::Json<DomainPayload>,
) -> ApiResult<HttpResponse> {
    let id = parse_domain_id(&path)?;
    let changes = parse_domain_changes(payload.into_inner());
    state.domains.update_domain(&principal, id, changes).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Delete a zone with all of its records.
#[utoipa::path(
    delete,
    path = "/domain/{id}",
    params(("id" = i64, Path, description = "Domain identifier")),
    responses(
        (status = 204, description = "Domain deleted"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["domains"],
    operation_id = "deleteDomain",
    security(("AccessToken" = []))
)]
#[delete("/domain/{id}")]
pub async fn delete_domain(
    state: web::Data<HttpState>,
    principal: Principal,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_domain_id(&path)?;
    state.domains.delete_domain(&principal, id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// List the records of one zone.
#[utoipa::path(
    get,
    path = "/domain/{id}/records",
    params(
        ("id" = i64, Path, description = "Domain identifier"),
        ("count" = Option<i64>, Query, description = "Page size; clamped to the configured maximum"),
        ("start" = Option<i64>, Query, description = "Zero-based offset")
    ),
    responses(
        (status = 200, description = "Records", body = [RecordBody]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["domains"],
    operation_id = "listDomainRecords",
    security(("AccessToken" = []))
)]
#[get("/domain/{id}/records")]
pub async fn list_domain_records(
    state: web::Data<HttpState>,
    principal: Principal,
    path: web::Path<String>,
    page: web::Query<PageQuery>,
) -> ApiResult<web::Json<Vec<RecordBody>>> {
    let id = parse_domain_id(&path)?;
    let records = state
        .domains
        .list_records(&principal, id, page.into_inner())
        .await?;
    Ok(web::Json(records.into_iter().map(RecordBody::from).collect()))
}

#[cfg(test)]
#[path = "domains_tests.rs"]
mod tests;

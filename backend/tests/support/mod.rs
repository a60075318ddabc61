//! Shared harness for HTTP integration tests over the in-memory store.

use std::sync::Arc;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{test, web};
use serde_json::{Value, json};

use zone_api::domain::{Fqdn, User, UserDraft, ZonePolicy};
use zone_api::inbound::http::auth::ACCESS_TOKEN_HEADER;
use zone_api::inbound::http::health::HealthState;
use zone_api::inbound::http::state::HttpState;
use zone_api::outbound::memory::{InMemoryUserRepository, InMemoryZoneRepository};
use zone_api::outbound::security::{BcryptPasswordHasher, MIN_PASSWORD_COST};
use zone_api::server::{AppDependencies, account_service, assemble_http_state};

/// Email of the bootstrapped administrator; the dot exercises SOA escaping.
pub const ADMIN_EMAIL: &str = "ops.team@example.org";

/// Stores plus a bootstrapped administrator.
pub struct Harness {
    pub zones: Arc<InMemoryZoneRepository>,
    pub users: Arc<InMemoryUserRepository>,
    pub state: web::Data<HttpState>,
    pub admin: User,
}

impl Harness {
    /// Dependencies for `build_app`.
    pub fn deps(&self) -> AppDependencies {
        let health = HealthState::new();
        health.mark_ready();
        AppDependencies {
            health_state: web::Data::new(health),
            http_state: self.state.clone(),
        }
    }

    /// Administrator token.
    pub fn admin_token(&self) -> &str {
        self.admin.token().as_ref()
    }
}

/// Build a harness whose policy announces `nameservers` in new zones.
pub async fn harness(nameservers: &[&str]) -> Harness {
    let policy = ZonePolicy::default().with_nameservers(
        nameservers
            .iter()
            .map(|ns| Fqdn::new(*ns).expect("nameserver"))
            .collect(),
    );
    let zones = Arc::new(InMemoryZoneRepository::default());
    let users = Arc::new(InMemoryUserRepository::default());
    let hasher = BcryptPasswordHasher::new(MIN_PASSWORD_COST);
    let admin = account_service(users.clone(), hasher)
        .bootstrap_admin(
            UserDraft::try_from_parts(ADMIN_EMAIL, "admin", Some("s3cret"), false)
                .expect("admin draft"),
        )
        .await
        .expect("bootstrap admin");
    let state = web::Data::new(assemble_http_state(
        zones.clone(),
        users.clone(),
        policy,
        hasher,
    ));
    Harness {
        zones,
        users,
        state,
        admin,
    }
}

/// Call the service and decode the body; an empty body decodes as `null`.
pub async fn send<S, B>(app: &S, req: Request) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = test::call_service(app, req).await;
    let status = res.status();
    let bytes = test::read_body(res).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

/// Authenticated JSON request.
pub fn authed(req: test::TestRequest, token: &str) -> test::TestRequest {
    req.insert_header((ACCESS_TOKEN_HEADER, token))
}

/// `POST /user` as `token`, returning the created account body.
pub async fn create_user<S, B>(app: &S, token: &str, name: &str) -> Value
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = authed(test::TestRequest::post().uri("/user"), token)
        .set_json(json!({
            "email": format!("{name}@example.org"),
            "username": name,
            "password": "pw",
        }))
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::OK, "create user: {body}");
    body
}

/// `POST /domain` as `token`, returning the created domain body.
pub async fn create_domain<S, B>(app: &S, token: &str, fqdn: &str) -> Value
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = authed(test::TestRequest::post().uri("/domain"), token)
        .set_json(json!({ "fqdn": fqdn, "description": "integration" }))
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::OK, "create domain: {body}");
    body
}

/// `POST /record` as `token`.
pub async fn post_record<S, B>(
    app: &S,
    token: &str,
    domain_id: i64,
    fqdn: &str,
    record_type: u16,
) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = authed(test::TestRequest::post().uri("/record"), token)
        .set_json(json!({
            "domainId": domain_id,
            "fqdn": fqdn,
            "content": "192.0.2.10",
            "type": record_type,
            "ttl": 300,
        }))
        .to_request();
    send(app, req).await
}

/// Every record of a domain, fetched with the largest page.
pub async fn records_of<S, B>(app: &S, token: &str, domain_id: i64) -> Vec<Value>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let uri = format!("/domain/{domain_id}/records?count=10");
    let req = authed(test::TestRequest::get().uri(&uri), token).to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::OK, "list records: {body}");
    body.as_array().cloned().expect("record array")
}

/// Current serial of a domain.
pub async fn serial_of<S, B>(app: &S, token: &str, domain_id: i64) -> u64
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let uri = format!("/domain/{domain_id}");
    let req = authed(test::TestRequest::get().uri(&uri), token).to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::OK, "get domain: {body}");
    body["serial"].as_u64().expect("serial")
}

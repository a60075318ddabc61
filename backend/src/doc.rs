//! OpenAPI document for the zone administration API.
//!
//! [`ApiDoc`] registers every handler, the request and response bodies, and
//! the `x-access-token` header scheme. Swagger UI serves it under `/docs`
//! and `cargo run --bin openapi-dump` prints it for external tooling.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::auth::ACCESS_TOKEN_HEADER;
use crate::inbound::http::domains::{DomainBody, DomainPayload};
use crate::inbound::http::health::PingBody;
use crate::inbound::http::records::{RecordBody, RecordPayload};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::users::{LoginForm, UserBody, UserPayload};

/// Adds the header token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "AccessToken",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                ACCESS_TOKEN_HEADER,
                "Bearer token returned by POST /login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Zone administration API",
        description = "Manage DNS zones, their records and the accounts that own them."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("AccessToken" = [])),
    paths(
        crate::inbound::http::health::ping,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
        crate::inbound::http::users::login,
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::get_self,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::domains::list_domains,
        crate::inbound::http::domains::create_domain,
        crate::inbound::http::domains::get_domain,
        crate::inbound::http::domains::update_domain,
        crate::inbound::http::domains::delete_domain,
        crate::inbound::http::domains::list_domain_records,
        crate::inbound::http::records::create_record,
        crate::inbound::http::records::get_record,
        crate::inbound::http::records::update_record,
        crate::inbound::http::records::delete_record,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        PingBody,
        LoginForm,
        UserBody,
        UserPayload,
        DomainBody,
        DomainPayload,
        RecordBody,
        RecordPayload,
    )),
    tags(
        (name = "health", description = "Liveness and readiness probes"),
        (name = "users", description = "Accounts and login"),
        (name = "domains", description = "Zones and their apex settings"),
        (name = "records", description = "Resource records inside a zone")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";

    fn object_fields(schema: &RefOr<Schema>) -> Vec<String> {
        match schema {
            RefOr::T(Schema::Object(obj)) => obj.properties.keys().cloned().collect(),
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    fn error_schema_uses_camel_case_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let fields = object_fields(schemas.get(ERROR_SCHEMA_NAME).expect("Error schema"));
        for field in ["code", "message", "traceId", "details"] {
            assert!(fields.iter().any(|f| f == field), "missing {field}");
        }
    }

    #[rstest]
    #[case("/domains")]
    #[case("/domain/{id}/records")]
    #[case("/record/{id}")]
    #[case("/user/self")]
    #[case("/login")]
    #[case("/ping")]
    fn every_route_is_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[rstest]
    fn access_token_scheme_reads_the_header() {
        let doc = ApiDoc::openapi();
        let json = serde_json::to_value(&doc).expect("serialise");
        let scheme = &json["components"]["securitySchemes"]["AccessToken"];
        assert_eq!(scheme["in"], "header");
        assert_eq!(scheme["name"], ACCESS_TOKEN_HEADER);
    }

    #[rstest]
    fn record_body_exposes_the_type_field() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let fields = object_fields(schemas.get("RecordBody").expect("RecordBody"));
        assert!(fields.iter().any(|f| f == "type"));
        assert!(fields.iter().any(|f| f == "domainId"));
    }
}

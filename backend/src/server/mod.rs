//! Server construction and middleware wiring.

mod config;
mod settings;
mod state_builders;

pub use config::ServerConfig;
pub use settings::{ServerSettings, SettingsError};
pub use state_builders::{AccountService, account_service, assemble_http_state, memory_http_state};

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::doc::ApiDoc;
use crate::inbound::http::domains::{
    create_domain, delete_domain, get_domain, list_domain_records, list_domains, update_domain,
};
use crate::inbound::http::error::{form_config, json_config, query_config};
use crate::inbound::http::health::{HealthState, live, ping, ready};
use crate::inbound::http::records::{create_record, delete_record, get_record, update_record};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::{
    create_user, delete_user, get_self, get_user, login, update_user,
};
use crate::middleware::Trace;
use state_builders::build_http_state;

/// Shared state cloned into every worker.
#[derive(Clone)]
pub struct AppDependencies {
    /// Probe state flipped once the listener is bound.
    pub health_state: web::Data<HealthState>,
    /// Ports behind the handlers.
    pub http_state: web::Data<HttpState>,
}

/// Register every route, extractor config and middleware.
///
/// `/user/self` is registered ahead of `/user/{id}` so the literal segment
/// wins.
pub fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
    } = deps;

    App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(json_config())
        .app_data(query_config())
        .app_data(form_config())
        .wrap(Trace)
        .service(ping)
        .service(ready)
        .service(live)
        .service(login)
        .service(get_self)
        .service(create_user)
        .service(get_user)
        .service(update_user)
        .service(delete_user)
        .service(list_domains)
        .service(create_domain)
        .service(list_domain_records)
        .service(get_domain)
        .service(update_domain)
        .service(delete_domain)
        .service(create_record)
        .service(get_record)
        .service(update_record)
        .service(delete_record)
        .service(SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

/// Bind the HTTP server and mark it ready.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when the socket cannot be bound, or when
/// the in-memory store has no administrator to seed.
pub async fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let http_state = build_http_state(&config).await?;
    let bind_addr = config.bind_addr();
    info!(
        %bind_addr,
        persistent = config.is_persistent(),
        nameservers = config.policy().nameservers().len(),
        "starting zone api"
    );

    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

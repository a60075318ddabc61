//! Zone API entry-point: loads settings, prepares storage and serves HTTP.

use actix_web::web;
use ortho_config::OrthoConfig as _;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use zone_api::inbound::http::health::HealthState;
use zone_api::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use zone_api::server::{ServerConfig, ServerSettings, create_server};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(e) = fmt().with_env_filter(filter).json().try_init() {
        warn!(error = %e, "tracing init failed");
    }
}

async fn apply_migrations(database_url: String) -> std::io::Result<()> {
    let applied = web::block(move || run_migrations(&database_url))
        .await
        .map_err(|err| std::io::Error::other(format!("migration task failed: {err}")))?
        .map_err(std::io::Error::other)?;
    info!(applied, "database schema up to date");
    Ok(())
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_tracing();

    let settings = ServerSettings::load().map_err(|err| std::io::Error::other(err.to_string()))?;
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;
    let policy = settings.zone_policy().map_err(std::io::Error::other)?;
    let hasher = settings.password_hasher().map_err(std::io::Error::other)?;
    let admin = settings.bootstrap_admin().map_err(std::io::Error::other)?;
    let mut config = ServerConfig::new(bind_addr, policy).with_password_hasher(hasher);

    match settings.database_url() {
        Some(url) => {
            if settings.migrate {
                apply_migrations(url.to_owned()).await?;
            }
            let pool = DbPool::new(PoolConfig::new(url))
                .await
                .map_err(std::io::Error::other)?;
            config = config.with_db_pool(pool);
        }
        None => warn!("no database_url configured; zones are kept in memory"),
    }
    if let Some(draft) = admin {
        config = config.with_bootstrap_admin(draft);
    }

    let health_state = web::Data::new(HealthState::new());
    create_server(health_state, config).await?.await
}

//! Create an administrator account directly in the database and print its
//! access token. Used to bootstrap a fresh deployment, where no account yet
//! exists that could call `POST /user`.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::io;
use std::sync::Arc;

use clap::Parser;
use tokio::runtime::Builder;

use zone_api::domain::UserDraft;
use zone_api::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig, run_migrations};
use zone_api::outbound::security::{BcryptPasswordHasher, DEFAULT_PASSWORD_COST};
use zone_api::server::account_service;

const DATABASE_URL_ENV: &str = "ZONE_API_DATABASE_URL";

/// `create-admin` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "create-admin",
    about = "Create an administrator account and print its access token",
    version
)]
struct CliArgs {
    /// Contact address, also used in SOA records of zones the admin edits.
    #[arg(long, value_name = "address")]
    email: String,
    /// Login name.
    #[arg(long, value_name = "name")]
    username: String,
    /// Login password.
    #[arg(long, value_name = "password")]
    password: String,
    /// Database connection URL. Falls back to `ZONE_API_DATABASE_URL`.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
    /// Apply pending migrations first.
    #[arg(long)]
    migrate: bool,
    /// bcrypt work factor for the stored password.
    #[arg(
        long = "password-cost",
        value_name = "cost",
        default_value_t = DEFAULT_PASSWORD_COST,
        value_parser = clap::value_parser!(u32).range(4..=31)
    )]
    password_cost: u32,
}

fn main() -> io::Result<()> {
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let draft = UserDraft::try_from_parts(&args.email, &args.username, Some(&args.password), true)
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error.to_string()))?;

    let database_url = resolve_database_url(args.database_url)?;
    if args.migrate {
        let url = database_url.clone();
        tokio::task::spawn_blocking(move || run_migrations(&url))
            .await
            .map_err(|error| io::Error::other(format!("migration task failed: {error}")))?
            .map_err(io::Error::other)?;
    }
    let pool = DbPool::new(PoolConfig::new(&database_url).with_min_idle(None))
        .await
        .map_err(|error| io::Error::other(format!("create database pool: {error}")))?;

    let accounts = account_service(
        Arc::new(DieselUserRepository::new(pool)),
        BcryptPasswordHasher::new(args.password_cost),
    );
    let admin = accounts
        .bootstrap_admin(draft)
        .await
        .map_err(|error| io::Error::other(format!("create admin failed: {}", error.message())))?;

    println!("id={}", admin.id());
    println!("username={}", admin.username());
    println!("token={}", admin.token().as_ref());
    Ok(())
}

fn resolve_database_url(explicit: Option<String>) -> io::Result<String> {
    if let Some(value) = explicit {
        if value.trim().is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "--database-url must not be empty when provided",
            ));
        }
        return Ok(value);
    }

    env::var(DATABASE_URL_ENV).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "database URL missing: set --database-url or ZONE_API_DATABASE_URL",
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use env_lock::lock_env;
    use rstest::rstest;

    #[rstest]
    fn explicit_urls_win() {
        let url = resolve_database_url(Some("postgres://localhost/zones".to_owned()))
            .expect("explicit url");
        assert_eq!(url, "postgres://localhost/zones");
    }

    #[rstest]
    fn blank_explicit_urls_are_rejected() {
        let error = resolve_database_url(Some("  ".to_owned())).expect_err("blank");
        assert_eq!(error.kind(), io::ErrorKind::InvalidInput);
    }

    #[rstest]
    fn missing_urls_are_reported() {
        let _guard = lock_env([(DATABASE_URL_ENV, None::<String>)]);
        let error = resolve_database_url(None).expect_err("missing");
        assert_eq!(error.kind(), io::ErrorKind::InvalidInput);
    }

    #[rstest]
    fn arguments_parse() {
        let args = CliArgs::try_parse_from([
            "create-admin",
            "--email",
            "root@example.org",
            "--username",
            "root",
            "--password",
            "pw",
            "--migrate",
        ])
        .expect("parse");
        assert!(args.migrate);
        assert!(args.database_url.is_none());
        assert_eq!(args.password_cost, DEFAULT_PASSWORD_COST);
    }

    #[rstest]
    #[case("10", true)]
    #[case("3", false)]
    #[case("32", false)]
    fn password_costs_are_bounded(#[case] cost: &str, #[case] accepted: bool) {
        let parsed = CliArgs::try_parse_from([
            "create-admin",
            "--email",
            "root@example.org",
            "--username",
            "root",
            "--password",
            "pw",
            "--password-cost",
            cost,
        ]);
        assert_eq!(parsed.is_ok(), accepted);
    }
}

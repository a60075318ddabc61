//! PostgreSQL adapters for the zone and user repositories.
//!
//! Row structs and the Diesel schema stay private to this module; the
//! repositories hand out domain values only. Connections come from a shared
//! `bb8` pool of `diesel-async` connections.
//!
//! ```ignore
//! use zone_api::outbound::persistence::{DbPool, DieselZoneRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/zones")).await?;
//! let zones = DieselZoneRepository::new(pool);
//! ```

mod diesel_error_mapping;
mod diesel_user_repository;
mod diesel_zone_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_user_repository::DieselUserRepository;
pub use diesel_zone_repository::DieselZoneRepository;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};

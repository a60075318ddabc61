//! In-memory driven adapters.
//!
//! Used when no database URL is configured and by the integration tests.
//! Each store serialises access through one mutex, which also gives
//! `mutate_zone` its all-or-nothing behaviour.

mod user_repository;
mod zone_repository;

pub use user_repository::InMemoryUserRepository;
pub use zone_repository::InMemoryZoneRepository;

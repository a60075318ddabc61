//! Driven adapters implementing the domain ports.
//!
//! - **memory**: process-local repositories for development and tests
//! - **persistence**: PostgreSQL repositories using Diesel
//! - **security**: password digests and bearer token generation

pub mod memory;
pub mod persistence;
pub mod security;

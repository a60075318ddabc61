//! HTTP inbound adapter exposing the zone administration REST endpoints.
//!
//! Handlers translate JSON, form and path input into validated domain drafts,
//! call the driving ports held in [`state::HttpState`], and render domain
//! values back as camelCase JSON.

pub mod auth;
pub mod domains;
pub mod error;
pub mod health;
pub mod records;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;

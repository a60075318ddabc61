//! Zone administration API: users, DNS zones and their resource records
//! served over HTTP, with every record change refreshing the zone's SOA.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;

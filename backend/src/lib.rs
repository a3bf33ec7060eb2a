//! Account provisioning service.
//!
//! Creates user accounts across a local identity store and a remote profile
//! service so that either both sides hold the account or neither does.

pub mod default_admin;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;

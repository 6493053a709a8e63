//! Envoy external-authorization service for multi-tenant ingestion.
//!
//! Each check decodes Basic-Auth credentials, hashes them into a lookup key,
//! resolves the key to a tenant in the credential store and answers with a
//! deny (HTTP 401) or an allow carrying the tenant headers for the path.

pub mod cli;
pub mod config;
pub mod decision;
pub mod logging;
pub mod response;
pub mod server;
pub mod service;
pub mod telemetry;

pub use config::{AuthzConfig, HeaderPolicyConfig, HeaderRule};
pub use decision::{AuthResult, DecisionEngine, FailureReason};
pub use response::ResponseBuilder;
pub use service::AuthorizationService;

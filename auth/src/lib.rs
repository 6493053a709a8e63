//! Credential handling for the tenant authorization service.
//!
//! This crate provides:
//! - A case-normalized view over inbound request headers
//! - Basic-Auth credential extraction from the `authorization` header
//! - Deterministic lookup-key derivation for the credential store

mod credentials;
mod headers;
mod lookup_key;

pub use credentials::{extract_basic_credentials, CredentialError, Credentials, BASIC_SCHEME};
pub use headers::{RequestHeaders, AUTHORIZATION_HEADER};
pub use lookup_key::LookupKey;

//! Credential store access for the tenant authorization service.
//!
//! Provides:
//! - The `CredentialStore` backend trait (lookup-key -> tenant id)
//! - `StoreClient`, a deadline-bounded client that classifies every lookup
//!   into found / not found / unavailable
//!
//! Supported backends:
//! - Redis (default, pooled)
//! - Memory (tests and local development)

mod client;
pub mod config;
mod core;
mod factory;
mod memory;
mod redis;

pub use crate::client::{LookupOutcome, StoreClient};
pub use crate::config::{MemoryConfig, RedisConfig, StoreBackend, StoreConfig};
pub use crate::core::{CredentialStore, StoreError, StoreResult, TenantId};
pub use crate::factory::create_store;
pub use crate::memory::MemoryCredentialStore;
pub use crate::redis::RedisCredentialStore;

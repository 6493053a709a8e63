// core.rs
//
// Core types for the credential store: tenant id, error type, backend trait.

use std::{
    fmt::{Display, Formatter},
    time::Duration,
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Tenant identity stored as the value of a lookup key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct TenantId(pub String);

impl TenantId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for TenantId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TenantId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl Display for TenantId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result alias for credential store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Error type for credential store operations
///
/// Messages may contain backend detail and are meant for operator logs only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("connection pool error: {0}")]
    Pool(String),

    #[error("store command failed: {0}")]
    Command(String),

    #[error("lookup timed out after {0:?}")]
    Timeout(Duration),

    #[error("invalid store configuration: {0}")]
    Config(String),
}

/// Read-only interface every credential store backend implements.
///
/// A missing key is `Ok(None)`, never an error.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    async fn get_tenant(&self, key: &str) -> StoreResult<Option<TenantId>>;

    /// Round-trip to the backend to confirm it is reachable.
    async fn ping(&self) -> StoreResult<()>;

    /// Release pooled connections. Called once at shutdown.
    fn close(&self) {}

    fn backend_name(&self) -> &'static str;
}

//! Deadline-bounded lookups with a uniform three-way outcome.

use std::{sync::Arc, time::Duration};

use tracing::{debug, error};

use crate::core::{CredentialStore, StoreError, TenantId};

/// Classified result of a single credential lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Found(TenantId),
    /// The key is not provisioned. An expected outcome, not a fault.
    NotFound,
    /// The store could not answer: pool exhaustion, connection or protocol
    /// failure, or the deadline expired.
    Unavailable(StoreError),
}

/// Process-wide handle to the credential store.
///
/// Cloning is cheap and shares the underlying backend and its pool.
#[derive(Clone)]
pub struct StoreClient {
    store: Arc<dyn CredentialStore>,
    deadline: Duration,
}

impl StoreClient {
    pub fn new(store: Arc<dyn CredentialStore>, deadline: Duration) -> Self {
        Self { store, deadline }
    }

    /// Default per-lookup deadline
    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    /// Look `key` up, giving up after `timeout` regardless of the caller's deadline.
    ///
    /// Exactly one backend call is made; there are no retries.
    ///
    /// Key material only ever reaches debug-level events.
    pub async fn lookup(&self, key: &str, timeout: Duration) -> LookupOutcome {
        let key_prefix = key.get(..12).unwrap_or(key);
        match tokio::time::timeout(timeout, self.store.get_tenant(key)).await {
            Ok(Ok(Some(tenant))) => LookupOutcome::Found(tenant),
            Ok(Ok(None)) => {
                debug!(key_prefix, "lookup key not provisioned");
                LookupOutcome::NotFound
            }
            Ok(Err(e)) => {
                debug!(key_prefix, "lookup failed for key");
                error!(
                    backend = self.store.backend_name(),
                    error = %e,
                    "credential store lookup failed"
                );
                LookupOutcome::Unavailable(e)
            }
            Err(_) => {
                let e = StoreError::Timeout(timeout);
                debug!(key_prefix, "lookup timed out for key");
                error!(
                    backend = self.store.backend_name(),
                    timeout_ms = timeout.as_millis() as u64,
                    error = %e,
                    "credential store lookup timed out"
                );
                LookupOutcome::Unavailable(e)
            }
        }
    }

    /// Startup connectivity check, bounded by `timeout`.
    pub async fn ping(&self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.store.ping())
            .await
            .map_err(|_| StoreError::Timeout(timeout))?
    }

    pub fn close(&self) {
        self.store.close();
    }
}

impl std::fmt::Debug for StoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreClient")
            .field("backend", &self.store.backend_name())
            .field("deadline", &self.deadline)
            .finish()
    }
}

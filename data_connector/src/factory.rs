//! Builds the configured credential store backend.

use std::sync::Arc;

use tracing::info;

use crate::{
    client::StoreClient,
    config::{StoreBackend, StoreConfig},
    core::{StoreError, StoreResult},
    memory::MemoryCredentialStore,
    redis::RedisCredentialStore,
};

/// Create the process-wide store client for `config`.
///
/// Validates the configuration first; connectivity is checked separately
/// with [`StoreClient::ping`].
pub fn create_store(config: &StoreConfig) -> StoreResult<StoreClient> {
    config.validate().map_err(StoreError::Config)?;

    let deadline = config.lookup_timeout();
    let client = match config.backend {
        StoreBackend::Redis => {
            info!(redis = ?config.redis, "initializing redis credential store");
            let store = RedisCredentialStore::new(&config.redis, deadline)?;
            StoreClient::new(Arc::new(store), deadline)
        }
        StoreBackend::Memory => {
            info!(
                entries = config.memory.entries.len(),
                "initializing in-memory credential store"
            );
            let store = MemoryCredentialStore::with_entries(config.memory.entries.clone());
            StoreClient::new(Arc::new(store), deadline)
        }
    };

    Ok(client)
}

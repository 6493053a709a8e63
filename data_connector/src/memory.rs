//! In-memory credential store for tests and local development.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::core::{CredentialStore, StoreResult, TenantId};

#[derive(Default)]
pub struct MemoryCredentialStore {
    entries: RwLock<HashMap<String, TenantId>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let store = Self::new();
        for (key, tenant) in entries {
            store.insert(key, tenant);
        }
        store
    }

    pub fn insert(&self, key: impl Into<String>, tenant: impl Into<String>) {
        self.entries
            .write()
            .insert(key.into(), TenantId(tenant.into()));
    }

    pub fn remove(&self, key: &str) -> Option<TenantId> {
        self.entries.write().remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get_tenant(&self, key: &str) -> StoreResult<Option<TenantId>> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

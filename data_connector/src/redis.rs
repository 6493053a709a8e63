//! Redis credential store backed by a deadpool connection pool
//!
//! Each lookup is a single `GET <lookup-key>`; a nil reply means the
//! credentials are not provisioned.

use async_trait::async_trait;
use deadpool_redis::{Config, Pool, PoolConfig, Runtime};
use redis::AsyncCommands;
use tracing::info;

use crate::{
    config::RedisConfig,
    core::{CredentialStore, StoreError, StoreResult, TenantId},
};

pub struct RedisCredentialStore {
    pool: Pool,
}

impl RedisCredentialStore {
    /// Build the pool. No connection is opened until the first checkout.
    ///
    /// `wait_timeout` bounds how long a lookup may queue for a free
    /// connection, so an exhausted pool fails instead of queueing forever.
    pub fn new(config: &RedisConfig, wait_timeout: std::time::Duration) -> StoreResult<Self> {
        let mut cfg = Config::from_url(config.url.clone());
        let mut pool_config = PoolConfig::new(config.pool_max);
        pool_config.timeouts.wait = Some(wait_timeout);
        pool_config.timeouts.create = Some(config.connect_timeout());
        pool_config.timeouts.recycle = Some(config.connect_timeout());
        cfg.pool = Some(pool_config);
        let pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| StoreError::Config(e.to_string()))?;

        info!(pool_max = config.pool_max, "redis credential store pool created");
        Ok(Self { pool })
    }

    async fn connection(&self) -> StoreResult<deadpool_redis::Connection> {
        self.pool
            .get()
            .await
            .map_err(|e| StoreError::Pool(e.to_string()))
    }
}

#[async_trait]
impl CredentialStore for RedisCredentialStore {
    async fn get_tenant(&self, key: &str) -> StoreResult<Option<TenantId>> {
        let mut conn = self.connection().await?;
        let tenant: Option<String> = conn
            .get(key)
            .await
            .map_err(|e| StoreError::Command(e.to_string()))?;
        Ok(tenant.map(TenantId::from))
    }

    async fn ping(&self) -> StoreResult<()> {
        let mut conn = self.connection().await?;
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map_err(|e| StoreError::Command(e.to_string()))?;
        Ok(())
    }

    fn close(&self) {
        self.pool.close();
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

//! Credential store configuration types.

use std::{collections::HashMap, time::Duration};

use serde::{Deserialize, Serialize};
use url::Url;

/// Credential store backend selection
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Redis,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Per-lookup deadline, independent of any caller deadline
    #[serde(default = "default_lookup_timeout_ms")]
    pub lookup_timeout_ms: u64,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
}

fn default_lookup_timeout_ms() -> u64 {
    2_000
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            lookup_timeout_ms: default_lookup_timeout_ms(),
            redis: RedisConfig::default(),
            memory: MemoryConfig::default(),
        }
    }
}

impl StoreConfig {
    pub fn default_lookup_timeout_ms() -> u64 {
        default_lookup_timeout_ms()
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.lookup_timeout_ms == 0 {
            return Err("lookup_timeout_ms must be greater than 0".to_string());
        }
        match self.backend {
            StoreBackend::Redis => self.redis.validate(),
            StoreBackend::Memory => Ok(()),
        }
    }
}

#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct RedisConfig {
    // Redis connection URL
    // redis://[:password@]host[:port][/db]
    #[serde(default = "default_redis_url")]
    pub url: String,
    // Connection pool max size
    #[serde(default = "default_redis_pool_max")]
    pub pool_max: usize,
    // Timeout for establishing a connection and for the startup ping
    #[serde(default = "default_redis_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

fn default_redis_url() -> String {
    "redis://redis:6379".to_string()
}

fn default_redis_pool_max() -> usize {
    10
}

fn default_redis_connect_timeout_ms() -> u64 {
    5_000
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            pool_max: default_redis_pool_max(),
            connect_timeout_ms: default_redis_connect_timeout_ms(),
        }
    }
}

impl RedisConfig {
    /// Build a URL from a bare host and port, as deployments configured
    /// through `REDIS_HOST`/`REDIS_PORT` provide them.
    pub fn url_from_host_port(host: &str, port: u16) -> String {
        format!("redis://{host}:{port}")
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), String> {
        let s = self.url.trim();
        if s.is_empty() {
            return Err("redis url should not be empty".to_string());
        }

        let url = Url::parse(s).map_err(|e| format!("invalid redis url: {}", e))?;

        let scheme = url.scheme();
        if scheme != "redis" && scheme != "rediss" {
            return Err(format!("unsupported URL scheme: {}", scheme));
        }

        if url.host().is_none() {
            return Err("redis url must have a host".to_string());
        }

        if self.pool_max == 0 {
            return Err("pool_max must be greater than 0".to_string());
        }

        if self.connect_timeout_ms == 0 {
            return Err("connect_timeout_ms must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl std::fmt::Debug for RedisConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let url = match Url::parse(&self.url) {
            Ok(mut parsed) if parsed.password().is_some() => {
                let _ = parsed.set_password(Some("***"));
                parsed.to_string()
            }
            _ => self.url.clone(),
        };
        f.debug_struct("RedisConfig")
            .field("url", &url)
            .field("pool_max", &self.pool_max)
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .finish()
    }
}

/// Seed entries for the in-memory backend, keyed by lookup key
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MemoryConfig {
    #[serde(default)]
    pub entries: HashMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn redis(url: &str) -> RedisConfig {
        RedisConfig {
            url: url.to_string(),
            ..RedisConfig::default()
        }
    }

    #[test]
    fn defaults_match_reference_deployment() {
        let config = StoreConfig::default();
        assert_eq!(config.backend, StoreBackend::Redis);
        assert_eq!(config.redis.url, "redis://redis:6379");
        assert_eq!(config.redis.pool_max, 10);
        assert_eq!(config.lookup_timeout(), Duration::from_secs(2));
        assert_eq!(config.redis.connect_timeout(), Duration::from_secs(5));
        assert!(config.validate().is_ok());

        let parsed: StoreConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn accepts_redis_and_rediss_urls() {
        assert!(redis("redis://localhost:6379").validate().is_ok());
        assert!(redis("rediss://:pw@cache.internal:6380/2").validate().is_ok());
    }

    #[test]
    fn rejects_bad_redis_urls() {
        assert!(redis("").validate().is_err());
        assert!(redis("not a url").validate().is_err());
        assert!(redis("http://localhost:6379").validate().is_err());
    }

    #[test]
    fn rejects_zero_lookup_timeout() {
        let config = StoreConfig {
            lookup_timeout_ms: 0,
            ..StoreConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_pool() {
        let config = RedisConfig {
            pool_max: 0,
            ..RedisConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn memory_backend_skips_redis_validation() {
        let config = StoreConfig {
            backend: StoreBackend::Memory,
            lookup_timeout_ms: 100,
            redis: redis(""),
            memory: MemoryConfig::default(),
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn url_from_host_port_builds_redis_url() {
        let url = RedisConfig::url_from_host_port("redis", 6379);
        assert_eq!(url, "redis://redis:6379");
        assert!(redis(&url).validate().is_ok());
    }

    #[test]
    fn debug_masks_password() {
        let rendered = format!("{:?}", redis("redis://:hunter2@cache:6379/0"));
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("cache"));
    }
}

//! Command-line flags. Every flag also reads an environment variable, and
//! any flag that is set overrides the YAML config file.

use std::path::PathBuf;

use clap::Parser;
use credential_store::RedisConfig;

use crate::config::{AuthzConfig, ConfigError, LogFormat};

#[derive(Debug, Parser)]
#[command(
    name = "tenant-authz",
    version,
    about = "Envoy ext_authz service mapping Basic-Auth credentials to tenants"
)]
pub struct CliArgs {
    /// YAML config file used as the base configuration
    #[arg(long, env = "AUTHZ_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address the gRPC server binds to
    #[arg(long, env = "AUTHZ_HOST")]
    pub host: Option<String>,

    #[arg(long, env = "AUTHZ_PORT")]
    pub port: Option<u16>,

    /// Full Redis URL; takes precedence over --redis-host/--redis-port
    #[arg(long, env = "REDIS_URL")]
    pub redis_url: Option<String>,

    #[arg(long, env = "REDIS_HOST")]
    pub redis_host: Option<String>,

    #[arg(long, env = "REDIS_PORT")]
    pub redis_port: Option<u16>,

    #[arg(long, env = "REDIS_POOL_MAX")]
    pub redis_pool_max: Option<usize>,

    /// Deadline for a single credential lookup, in milliseconds
    #[arg(long, env = "LOOKUP_TIMEOUT_MS")]
    pub lookup_timeout_ms: Option<u64>,

    #[arg(long, env = "LOG_LEVEL")]
    pub log_level: Option<String>,

    #[arg(long, env = "LOG_FORMAT", value_enum)]
    pub log_format: Option<LogFormat>,

    /// Serve Prometheus metrics on this port
    #[arg(long, env = "METRICS_PORT")]
    pub metrics_port: Option<u16>,
}

impl CliArgs {
    /// Resolve the final configuration and validate it.
    pub fn load_config(&self) -> Result<AuthzConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => AuthzConfig::from_yaml_file(path)?,
            None => AuthzConfig::default(),
        };
        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply(&self, config: &mut AuthzConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }

        if let Some(url) = &self.redis_url {
            config.store.redis.url = url.clone();
        } else if self.redis_host.is_some() || self.redis_port.is_some() {
            config.store.redis.url = RedisConfig::url_from_host_port(
                self.redis_host.as_deref().unwrap_or("redis"),
                self.redis_port.unwrap_or(6379),
            );
        }
        if let Some(pool_max) = self.redis_pool_max {
            config.store.redis.pool_max = pool_max;
        }
        if let Some(timeout) = self.lookup_timeout_ms {
            config.store.lookup_timeout_ms = timeout;
        }

        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
        if let Some(port) = self.metrics_port {
            config.metrics.port = Some(port);
        }
    }
}

//! Service configuration: YAML file as the base, CLI flags and environment on top.

use std::{
    net::{IpAddr, SocketAddr},
    path::{Path, PathBuf},
};

use credential_store::StoreConfig;
use http::HeaderName;
use serde::{Deserialize, Serialize};

/// Header the ingestion backends (Loki, Mimir/Cortex) read the tenant from
pub const SCOPE_ORG_ID_HEADER: &str = "X-Scope-OrgID";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AuthzConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub policy: HeaderPolicyConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl AuthzConfig {
    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.socket_addr()?;
        self.store
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("store: {e}")))?;
        self.policy.validate()?;
        self.metrics.socket_addr()?;
        if tracing_subscriber::EnvFilter::try_new(&self.logging.level).is_err() {
            return Err(ConfigError::Invalid(format!(
                "logging: invalid level filter {:?}",
                self.logging.level
            )));
        }
        if self.metrics.port == Some(self.server.port) {
            return Err(ConfigError::Invalid(
                "metrics port must differ from the gRPC port".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9191
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("server: host {:?}: {e}", self.host)))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tenant headers injected into every request whose path starts with `path_prefix`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HeaderRule {
    pub path_prefix: String,
    pub headers: Vec<String>,
}

/// Which headers carry the tenant id on an allowed request.
///
/// Matching rules contribute their headers first, in rule order, followed by
/// `always_headers`. A name is injected at most once.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HeaderPolicyConfig {
    #[serde(default = "default_rules")]
    pub rules: Vec<HeaderRule>,
    #[serde(default)]
    pub always_headers: Vec<String>,
    /// Request headers the proxy should strip before forwarding upstream
    #[serde(default)]
    pub headers_to_remove: Vec<String>,
}

fn default_rules() -> Vec<HeaderRule> {
    ["/loki/api/v1/push", "/api/v1/receive"]
        .into_iter()
        .map(|prefix| HeaderRule {
            path_prefix: prefix.to_string(),
            headers: vec![SCOPE_ORG_ID_HEADER.to_string()],
        })
        .collect()
}

impl Default for HeaderPolicyConfig {
    fn default() -> Self {
        Self {
            rules: default_rules(),
            always_headers: Vec::new(),
            headers_to_remove: Vec::new(),
        }
    }
}

impl HeaderPolicyConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for rule in &self.rules {
            if rule.path_prefix.is_empty() {
                return Err(ConfigError::Invalid(
                    "policy: rule path_prefix must not be empty".to_string(),
                ));
            }
            if rule.headers.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "policy: rule for {:?} injects no headers",
                    rule.path_prefix
                )));
            }
        }
        let names = self
            .rules
            .iter()
            .flat_map(|rule| rule.headers.iter())
            .chain(&self.always_headers)
            .chain(&self.headers_to_remove);
        for name in names {
            HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
                ConfigError::Invalid(format!("policy: invalid header name {name:?}"))
            })?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    #[serde(alias = "dev")]
    #[value(alias = "dev")]
    Pretty,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence when set
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Prometheus scrape endpoint; disabled unless `port` is set
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricsConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default)]
    pub port: Option<u16>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: None,
        }
    }
}

impl MetricsConfig {
    pub fn socket_addr(&self) -> Result<Option<SocketAddr>, ConfigError> {
        let Some(port) = self.port else {
            return Ok(None);
        };
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("metrics: host {:?}: {e}", self.host)))?;
        Ok(Some(SocketAddr::new(ip, port)))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use credential_store::StoreBackend;

    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AuthzConfig::default();
        config.validate().unwrap();
        assert_eq!(
            config.server.socket_addr().unwrap(),
            "0.0.0.0:9191".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(config.policy.rules.len(), 2);
        assert!(config.policy.always_headers.is_empty());
        assert_eq!(config.metrics.socket_addr().unwrap(), None);
    }

    #[test]
    fn empty_yaml_equals_defaults() {
        assert_eq!(
            AuthzConfig::from_yaml_str("{}").unwrap(),
            AuthzConfig::default()
        );
    }

    #[test]
    fn parses_full_yaml() {
        let raw = r#"
server:
  host: "127.0.0.1"
  port: 9292
store:
  backend: memory
  lookup_timeout_ms: 250
  memory:
    entries:
      abc: tenant-a
policy:
  rules:
    - path_prefix: /otlp/v1/logs
      headers: [X-Scope-OrgID]
  always_headers: [X-Tenant-ID]
  headers_to_remove: [authorization]
logging:
  level: debug
  format: dev
metrics:
  port: 9000
"#;
        let config = AuthzConfig::from_yaml_str(raw).unwrap();
        config.validate().unwrap();
        assert_eq!(config.server.port, 9292);
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.store.lookup_timeout_ms, 250);
        assert_eq!(config.policy.rules[0].path_prefix, "/otlp/v1/logs");
        assert_eq!(config.policy.always_headers, vec!["X-Tenant-ID"]);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(
            config.metrics.socket_addr().unwrap(),
            Some("0.0.0.0:9000".parse::<SocketAddr>().unwrap())
        );
    }

    #[test]
    fn omitted_rules_keep_reference_prefixes() {
        let config = AuthzConfig::from_yaml_str("policy:\n  always_headers: [X-Tenant-ID]\n")
            .unwrap();
        assert_eq!(config.policy.rules, default_rules());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server:\n  port: 10000").unwrap();
        let config = AuthzConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(config.server.port, 10000);

        let missing = AuthzConfig::from_yaml_file(Path::new("/nonexistent/authz.yaml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn rejects_invalid_values() {
        let mut config = AuthzConfig::default();
        config.server.host = "not-an-ip".to_string();
        assert!(config.validate().is_err());

        let mut config = AuthzConfig::default();
        config.policy.always_headers = vec!["bad header".to_string()];
        assert!(config.validate().is_err());

        let mut config = AuthzConfig::default();
        config.policy.rules[0].path_prefix.clear();
        assert!(config.validate().is_err());

        let mut config = AuthzConfig::default();
        config.policy.rules[1].headers.clear();
        assert!(config.validate().is_err());

        let mut config = AuthzConfig::default();
        config.logging.level = "authz=verbose".to_string();
        assert!(config.validate().is_err());

        let mut config = AuthzConfig::default();
        config.metrics.port = Some(config.server.port);
        assert!(config.validate().is_err());

        let mut config = AuthzConfig::default();
        config.store.redis.url = "ftp://redis".to_string();
        assert!(config.validate().is_err());
    }
}

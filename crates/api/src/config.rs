use partcat_kernel::ConflictPolicy;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Errors raised while loading or checking a [`ServiceConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid listen address {addr:?}: {source}")]
    InvalidAddr {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("worker count must be at least 1, got {0}")]
    InvalidWorkers(usize),
}

/// Cross-origin headers attached to every response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    pub allowed_origins: String,
    pub allowed_headers: String,
    pub allowed_methods: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: "*".into(),
            allowed_headers: "X-Requested-With, Content-Type, Authorization".into(),
            allowed_methods: "GET, HEAD, POST, PUT, OPTIONS, DELETE, PATCH".into(),
        }
    }
}

/// Service configuration: listen address, storage medium, conflict policy
/// and the request worker pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Address the HTTP listener binds to.
    pub listen_addr: String,
    /// Directory of the durable catalog. `None` keeps the catalog in memory.
    pub data_dir: Option<PathBuf>,
    pub policy: ConflictPolicy,
    /// Number of threads pulling requests off the listener.
    pub workers: usize,
    pub cors: CorsConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:1710".into(),
            data_dir: None,
            policy: ConflictPolicy::default(),
            workers: 4,
            cors: CorsConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Parse a YAML document. Missing keys keep their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        tracing::debug!(path = %path.as_ref().display(), "loading service config");
        Self::from_yaml_str(&text)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.listen_addr
            .parse()
            .map_err(|source| ConfigError::InvalidAddr {
                addr: self.listen_addr.clone(),
                source,
            })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr()?;
        if self.workers == 0 {
            return Err(ConfigError::InvalidWorkers(self.workers));
        }
        Ok(())
    }
}

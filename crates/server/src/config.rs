//! Service configuration.
//!
//! Loaded from a TOML file, then patched from the environment:
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//!
//! [services.search]
//! host = "http://search:8000"
//!
//! [recommend]
//! default_limit = 10
//! per_criterion_limit = 20
//! filter_timeout_ms = 5000
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use pipeline::EndpointResolver;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ConfigError;

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "RECO_CONFIG";

/// Environment variable overriding `services.search.host`
pub const SEARCH_HOST_ENV: &str = "RECO_SEARCH_HOST";

/// Config file used when neither `--config` nor [`CONFIG_ENV`] is given
pub const DEFAULT_CONFIG_PATH: &str = "config/reco.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    /// Scoring services by name
    pub services: BTreeMap<String, ServiceEndpoint>,
    pub recommend: RecommendConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEndpoint {
    pub host: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendConfig {
    /// Page size when a request does not give one
    pub default_limit: usize,
    /// Assets requested from each scoring service per sub-criterion
    pub per_criterion_limit: usize,
    pub filter_timeout_ms: u64,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            per_criterion_limit: 20,
            filter_timeout_ms: 5000,
        }
    }
}

impl AppConfig {
    /// Load configuration using the process environment.
    ///
    /// See [`AppConfig::load_with`].
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(explicit, |key| std::env::var(key).ok())
    }

    /// Load configuration, reading environment variables through `lookup`.
    ///
    /// The file is `explicit`, else the path in [`CONFIG_ENV`], else
    /// [`DEFAULT_CONFIG_PATH`]. A requested file must exist; a missing
    /// default file means built-in defaults.
    ///
    /// # Errors
    /// Fails when the file cannot be read or parsed, or the result does not
    /// pass [`AppConfig::validate`].
    pub fn load_with(
        explicit: Option<&Path>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let requested = explicit
            .map(Path::to_path_buf)
            .or_else(|| lookup(CONFIG_ENV).map(PathBuf::from));

        let mut config = match requested {
            Some(path) => Self::from_file(&path)?,
            None => {
                let path = Path::new(DEFAULT_CONFIG_PATH);
                if path.exists() {
                    Self::from_file(path)?
                } else {
                    debug!("No config file at {:?}, using defaults", path);
                    Self::default()
                }
            }
        };

        config.apply_env_overrides(lookup);
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML config file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Apply [`SEARCH_HOST_ENV`] when it is set and non-empty.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(host) = lookup(SEARCH_HOST_ENV).filter(|host| !host.trim().is_empty()) {
            debug!("Search host overridden from {}", SEARCH_HOST_ENV);
            self.services
                .insert("search".to_string(), ServiceEndpoint { host });
        }
    }

    /// Reject settings the service cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid(
                "server.port must be non-zero".to_string(),
            ));
        }
        if self.recommend.filter_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "recommend.filter_timeout_ms must be non-zero".to_string(),
            ));
        }
        if self.recommend.per_criterion_limit == 0 {
            return Err(ConfigError::Invalid(
                "recommend.per_criterion_limit must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn filter_timeout(&self) -> Duration {
        Duration::from_millis(self.recommend.filter_timeout_ms)
    }

    pub fn with_service(mut self, name: impl Into<String>, host: impl Into<String>) -> Self {
        self.services
            .insert(name.into(), ServiceEndpoint { host: host.into() });
        self
    }
}

impl EndpointResolver for AppConfig {
    fn endpoint(&self, service: &str) -> Option<&str> {
        self.services.get(service).map(|endpoint| endpoint.host.as_str())
    }
}

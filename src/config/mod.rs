//! Configuration loading and management
//!
//! Settings come from an optional YAML file (path in `SPLIT_BOARD_CONFIG`)
//! layered over built-in defaults. Secrets are never part of the file: the
//! file only names the environment variables that hold them, and they are
//! resolved at the point of use via [`EnvSecret::resolve`].

use crate::core::error::{BoardResult, ConfigError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable naming the YAML config file
pub const CONFIG_PATH_VAR: &str = "SPLIT_BOARD_CONFIG";

/// Environment variable overriding `server.bind`
pub const BIND_ADDR_VAR: &str = "BIND_ADDR";

/// Name of an environment variable holding a secret
///
/// Serialized as the bare variable name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvSecret(String);

impl EnvSecret {
    pub fn new(var: impl Into<String>) -> Self {
        Self(var.into())
    }

    pub fn var_name(&self) -> &str {
        &self.0
    }

    /// Read the secret now; unset or blank values are a configuration error
    pub fn resolve(&self) -> Result<String, ConfigError> {
        match std::env::var(&self.0) {
            Ok(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(ConfigError::MissingVar {
                name: self.0.clone(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:3000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub base_url: String,

    /// Per-request timeout; expiry is reported as an upstream failure
    pub timeout_secs: u64,

    /// Bearer credential for the bookkeeping API
    pub api_key_env: EnvSecret,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://secure.splitwise.com/api/v3.0".to_string(),
            timeout_secs: 10,
            api_key_env: EnvSecret::new("SPLITWISE_API_KEY"),
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// How many of the latest upstream expenses each sync looks at
    pub page_size: usize,

    /// How many stored expenses the list endpoint returns
    pub list_limit: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            list_limit: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub webhook_url_env: EnvSecret,

    /// Link printed at the bottom of every notification block
    pub dashboard_url: String,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            webhook_url_env: EnvSecret::new("DISCORD_WEBHOOK_URL"),
            dashboard_url: "https://live-split-board.hermanyiqunliang.com/".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// `max-age` / `s-maxage` of the public cache directive on read endpoints
    pub cache_max_age_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            cache_max_age_secs: 1800,
        }
    }
}

impl HttpConfig {
    pub fn cache_control(&self) -> String {
        format!(
            "public, max-age={age}, s-maxage={age}",
            age = self.cache_max_age_secs
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub mongodb_uri_env: EnvSecret,

    /// Used when the URI variable is unset
    pub default_uri: String,

    pub database: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            mongodb_uri_env: EnvSecret::new("MONGODB_URI"),
            default_uri: "mongodb://localhost:27017/expense-tracker".to_string(),
            database: "expense-tracker".to_string(),
        }
    }
}

impl StorageConfig {
    /// Connection string from the environment, falling back to `default_uri`
    pub fn mongodb_uri(&self) -> String {
        self.mongodb_uri_env
            .resolve()
            .unwrap_or_else(|_| self.default_uri.clone())
    }
}

/// Complete service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub sync: SyncConfig,
    pub notify: NotifyConfig,
    pub http: HttpConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load configuration from the process environment
    ///
    /// Reads the YAML file named by `SPLIT_BOARD_CONFIG` when set, otherwise
    /// starts from defaults. `BIND_ADDR` overrides `server.bind`.
    pub fn load() -> BoardResult<Self> {
        let mut config = match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::from_yaml_file(&path)?,
            _ => Self::default(),
        };

        if let Ok(bind) = std::env::var(BIND_ADDR_VAR)
            && !bind.trim().is_empty()
        {
            config.server.bind = bind;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> BoardResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| {
            ConfigError::ParseError {
                file: Some(path.display().to_string()),
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> BoardResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Reject values that would make the service misbehave silently
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sync.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "sync.page_size".to_string(),
                value: "0".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        if self.upstream.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "upstream.timeout_secs".to_string(),
                value: "0".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

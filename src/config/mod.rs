//! Configuration loading and management
//!
//! Settings come from an optional YAML file and are then overlaid with
//! `CRM_*` environment variables. Every field has a default, so an empty
//! file (or no file at all) yields a working in-memory setup.

use crate::core::query::{CustomerQuery, LocationMatch};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Environment variable naming the YAML file to load
pub const CONFIG_PATH_ENV: &str = "CRM_CONFIG";

/// File loaded when `CRM_CONFIG` is unset and the file exists
pub const DEFAULT_CONFIG_FILE: &str = "crm.yaml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },

    #[error("storage backend 'postgres' requires a database URL (set CRM_DATABASE_URL)")]
    MissingDatabaseUrl,
}

/// Which `CustomerStore` implementation the server runs on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Postgres,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "in-memory" => Ok(StorageBackend::Memory),
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            other => Err(format!("expected 'memory' or 'postgres', got '{}'", other)),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Memory => write!(f, "memory"),
            StorageBackend::Postgres => write!(f, "postgres"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on
    pub bind_addr: String,

    /// Allow any origin, method and header
    pub cors_permissive: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5000".to_string(),
            cors_permissive: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,

    /// Pool size for the postgres backend
    pub max_connections: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            database_url: None,
            max_connections: 5,
        }
    }
}

/// Defaults applied to every customer list request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub location_match: LocationMatch,

    /// Page size when the request does not carry a usable `limit`
    pub default_limit: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            location_match: LocationMatch::default(),
            default_limit: CustomerQuery::DEFAULT_LIMIT,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub query: QueryConfig,

    /// Load the sample customers into an empty store at startup
    pub seed_sample_data: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            query: QueryConfig::default(),
            seed_sample_data: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Resolve the configuration the server binary runs with
    ///
    /// Reads `path` if given, otherwise `crm.yaml` when it exists, then
    /// applies environment overrides and validates the result.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_yaml_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_yaml_file(DEFAULT_CONFIG_FILE)?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay `CRM_*` variables looked up through `lookup`
    ///
    /// Blank values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(addr) = get("CRM_BIND_ADDR") {
            self.server.bind_addr = addr.trim().to_string();
        }
        if let Some(backend) = get("CRM_STORAGE_BACKEND") {
            self.storage.backend = backend
                .parse()
                .map_err(|message| ConfigError::InvalidValue {
                    key: "CRM_STORAGE_BACKEND",
                    message,
                })?;
        }
        if let Some(url) = get("CRM_DATABASE_URL").or_else(|| get("DATABASE_URL")) {
            self.storage.database_url = Some(url);
        }
        if let Some(policy) = get("CRM_LOCATION_MATCH") {
            self.query.location_match = policy
                .parse()
                .map_err(|message| ConfigError::InvalidValue {
                    key: "CRM_LOCATION_MATCH",
                    message,
                })?;
        }
        if let Some(seed) = get("CRM_SEED_SAMPLE_DATA") {
            self.seed_sample_data = parse_bool(&seed).ok_or_else(|| ConfigError::InvalidValue {
                key: "CRM_SEED_SAMPLE_DATA",
                message: format!("expected a boolean, got '{}'", seed),
            })?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.backend == StorageBackend::Postgres && self.storage.database_url.is_none()
        {
            return Err(ConfigError::MissingDatabaseUrl);
        }
        if self.query.default_limit == 0 {
            return Err(ConfigError::InvalidValue {
                key: "query.default_limit",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

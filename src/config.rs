//! Configuration types
//!
//! Settings for the paginator and the HTTP fetch strategy, loadable from
//! YAML or JSON files.

use crate::error::{Error, Result};
use crate::types::DEFAULT_LIMIT;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete configuration as loaded from a file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Paginator settings
    #[serde(default)]
    pub paginator: PaginatorConfig,

    /// HTTP source settings
    pub source: HttpSourceConfig,
}

impl Config {
    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values serde cannot
    pub fn validate(&self) -> Result<()> {
        self.source.validate()
    }
}

/// Load a config file, JSON for `.json` and YAML otherwise
pub fn load_config(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let contents = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        Config::from_json_str(&contents)
    } else {
        Config::from_yaml_str(&contents)
    }
}

// ============================================================================
// Paginator
// ============================================================================

/// Paginator settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginatorConfig {
    /// Page size; 0 loads everything with a single request
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl Default for PaginatorConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
        }
    }
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

// ============================================================================
// HTTP Source
// ============================================================================

/// Offset pagination over a JSON HTTP endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpSourceConfig {
    /// Endpoint URL, existing query parameters are kept
    pub url: String,

    /// Query parameter carrying the offset
    #[serde(default = "default_offset_param")]
    pub offset_param: String,

    /// Query parameter carrying the limit
    #[serde(default = "default_limit_param")]
    pub limit_param: String,

    /// Dot path to the records array (e.g., "data.items"); the whole body
    /// when absent
    #[serde(default)]
    pub records_path: Option<String>,

    /// Extra request headers
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_offset_param() -> String {
    "offset".to_string()
}

fn default_limit_param() -> String {
    "limit".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl HttpSourceConfig {
    /// Config with defaults for everything but the URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            offset_param: default_offset_param(),
            limit_param: default_limit_param(),
            records_path: None,
            headers: HashMap::new(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Set the records path
    #[must_use]
    pub fn with_records_path(mut self, path: impl Into<String>) -> Self {
        self.records_path = Some(path.into());
        self
    }

    /// Set the offset and limit parameter names
    #[must_use]
    pub fn with_params(mut self, offset: impl Into<String>, limit: impl Into<String>) -> Self {
        self.offset_param = offset.into();
        self.limit_param = limit.into();
        self
    }

    /// Add a request header
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check the URL and parameter names
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(Error::missing_field("source.url"));
        }
        url::Url::parse(&self.url)?;
        if self.offset_param.is_empty() || self.limit_param.is_empty() {
            return Err(Error::config("offset_param and limit_param must not be empty"));
        }
        if self.timeout_secs == 0 {
            return Err(Error::config("timeout_secs must be greater than zero"));
        }
        Ok(())
    }
}

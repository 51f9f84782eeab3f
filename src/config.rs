use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::issuance::types::RetryPolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config yaml: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Process-wide client configuration.
///
/// Read once at startup and handed to the coordinator and transport
/// explicitly; nothing in the crate looks it up globally.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AgcodConfig {
    /// Prepended to every caller request id to form `gcCreationRequestId`
    pub partner_id: String,
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    #[serde(default)]
    pub recipient_id: Option<String>,
    #[serde(default = "default_content_version")]
    pub content_version: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_retry_limit")]
    pub retry_limit: u32,
    #[serde(default = "default_retry_interval_secs")]
    pub retry_interval_secs: u64,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_dir: "./logs".to_string(),
            log_file: "agcod.log".to_string(),
            use_json: false,
            rotation: "daily".to_string(),
        }
    }
}

fn default_content_version() -> String {
    "2008-01-01".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_retry_limit() -> u32 {
    1
}

fn default_retry_interval_secs() -> u64 {
    5
}

impl AgcodConfig {
    /// Load `config/<env>.yaml`
    pub fn load(env: &str) -> Result<Self, ConfigError> {
        Self::from_file(format!("config/{}.yaml", env))
    }

    /// Load and validate configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: AgcodConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.partner_id.trim().is_empty() {
            return Err(ConfigError::Invalid("partner_id must not be empty".into()));
        }
        if self.retry_limit == 0 {
            return Err(ConfigError::Invalid("retry_limit must be at least 1".into()));
        }
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid("endpoint must not be empty".into()));
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            retry_limit: self.retry_limit,
            retry_interval: Duration::from_secs(self.retry_interval_secs),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

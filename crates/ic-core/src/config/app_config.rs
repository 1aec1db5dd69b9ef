use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default delay between an accepted barcode and the navigation push.
pub const DEFAULT_DEBOUNCE_MS: u64 = 1_000;
/// Default delay between two scan status requests.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(#[from] toml::de::Error),
}

/// Client configuration.
/// 客户端配置。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub scan: ScanConfig,
}

/// Backend connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the IngrediCheck backend, without trailing slash.
    pub base_url: String,
    /// Bearer token sent with every request, if set.
    pub auth_token: Option<String>,
    pub request_timeout_secs: u64,
}

/// Scan coordination timings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub debounce_ms: u64,
    pub poll_interval_ms: u64,
    /// Upper bound on status requests per poll loop. Unbounded when unset.
    pub max_poll_attempts: Option<u32>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            auth_token: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_poll_attempts: None,
        }
    }
}

impl AppConfig {
    /// Map a parsed TOML document onto the configuration.
    /// 从 TOML 值创建 AppConfig
    pub fn from_toml(toml_value: &toml::Value) -> Result<Self, ConfigError> {
        Ok(toml_value.clone().try_into()?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl ScanConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

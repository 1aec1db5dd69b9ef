//! # Configuration Loader / 配置加载器
//!
//! ## Responsibilities / 职责
//!
//! - ✅ Read TOML configuration files / 读取 TOML 配置文件
//! - ✅ Locate the default config file / 定位默认配置文件
//! - ✅ Apply environment overrides / 应用环境变量覆盖
//!
//! Defaults for missing keys live in `ic_core::config`, not here.

use std::path::{Path, PathBuf};

use anyhow::Context;
use ic_core::config::AppConfig;
use tracing::{debug, info};

pub const ENV_API_URL: &str = "INGREDICHECK_API_URL";
pub const ENV_AUTH_TOKEN: &str = "INGREDICHECK_AUTH_TOKEN";

const CONFIG_DIR_NAME: &str = "ingredicheck";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Load configuration from a TOML file
/// 从 TOML 文件加载配置
///
/// # Errors / 错误
///
/// Returns error if the file cannot be read, is not valid TOML, or a key
/// has the wrong type.
pub fn load_config(config_path: &Path) -> anyhow::Result<AppConfig> {
    let content = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
    let toml_value: toml::Value =
        toml::from_str(&content).context("Failed to parse config as TOML")?;
    AppConfig::from_toml(&toml_value)
        .with_context(|| format!("Invalid config file: {}", config_path.display()))
}

/// `<platform config dir>/ingredicheck/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Resolve the effective configuration.
///
/// An explicit path must exist. Without one the default path is used when
/// present, otherwise built-in defaults. Environment variables win over
/// file values.
pub fn resolve_config(explicit: Option<&Path>) -> anyhow::Result<AppConfig> {
    let mut config = match explicit {
        Some(path) => load_config(path)?,
        None => match default_config_path().filter(|path| path.is_file()) {
            Some(path) => load_config(&path)?,
            None => {
                debug!("no config file found, using defaults");
                AppConfig::default()
            }
        },
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    info!(base_url = %config.api.base_url, "configuration resolved");
    Ok(config)
}

fn apply_env_overrides(config: &mut AppConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
        config.api.base_url = url.trim().to_string();
    }
    if let Some(token) = lookup(ENV_AUTH_TOKEN).filter(|v| !v.trim().is_empty()) {
        config.api.auth_token = Some(token.trim().to_string());
    }
}

//! # Configuration DTOs / 配置数据
//!
//! Data structures for the client configuration and their TOML mapping.
//! Missing keys take the defaults below; wrongly typed values are errors.
//! Loading files and applying environment overrides is the host's job.

mod app_config;

pub use app_config::{ApiConfig, AppConfig, ConfigError, ScanConfig};

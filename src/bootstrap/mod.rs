//! Host bootstrap: configuration, tracing and dependency wiring.
//! 宿主启动：配置、日志与依赖装配。

pub mod config;
pub mod tracing;
pub mod wiring;

pub use config::{default_config_path, load_config, resolve_config};
pub use wiring::{wire_dependencies, AppServices};

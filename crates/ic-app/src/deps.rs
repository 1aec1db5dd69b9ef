//! # Application Dependencies / 应用依赖
//!
//! Dependency grouping for the scan use cases. Just parameter grouping:
//! no build steps, no defaults, no hidden logic.

use std::sync::Arc;

use ic_core::ports::{ClockPort, ScanApiPort};

use crate::usecases::NavigationPort;

/// Application dependency grouping (non-Builder, just parameter grouping)
/// 应用依赖分组（非 Builder，仅参数打包）
pub struct AppDeps {
    // Backend / 后端
    pub scan_api: Arc<dyn ScanApiPort>,

    // UI / 界面
    pub navigator: Arc<dyn NavigationPort>,

    // System / 系统
    pub clock: Arc<dyn ClockPort>,
}

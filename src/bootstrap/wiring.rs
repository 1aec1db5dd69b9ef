//! # Dependency Injection / 依赖注入模块
//!
//! The only place that depends on `ic-infra` and `ic-app` together. It
//! assembles adapters into ports and makes no decisions.

use std::sync::Arc;

use anyhow::Context;
use ic_app::{AppDeps, NavigationStack, ScanUseCases};
use ic_core::config::AppConfig;
use ic_core::ports::ScanApiPort;
use ic_infra::{HttpScanApi, SystemClock};

/// Everything a host command needs.
pub struct AppServices {
    pub use_cases: ScanUseCases,
    /// Concrete navigation stack, so the host can read what was pushed.
    pub navigation: Arc<NavigationStack>,
    pub scan_api: Arc<dyn ScanApiPort>,
}

pub fn wire_dependencies(config: &AppConfig) -> anyhow::Result<AppServices> {
    let scan_api: Arc<dyn ScanApiPort> = Arc::new(
        HttpScanApi::new(&config.api).context("Failed to create scan backend client")?,
    );
    let navigation = Arc::new(NavigationStack::new());

    let deps = AppDeps {
        scan_api: scan_api.clone(),
        navigator: navigation.clone(),
        clock: Arc::new(SystemClock),
    };

    Ok(AppServices {
        use_cases: ScanUseCases::new(deps, config.scan.clone()),
        navigation,
        scan_api,
    })
}

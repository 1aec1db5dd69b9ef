//! Factory for the scan use cases
//! 扫描用例工厂
//!
//! Each call hands out a new, independently owned use case instance: one
//! controller per scanner screen, one label analysis per capture session.

use ic_core::config::ScanConfig;
use ic_core::ScanId;

use crate::deps::AppDeps;
use crate::usecases::{BarcodeScanController, LabelAnalysis, PollPolicy};

pub struct ScanUseCases {
    deps: AppDeps,
    config: ScanConfig,
}

impl ScanUseCases {
    pub fn new(deps: AppDeps, config: ScanConfig) -> Self {
        Self { deps, config }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn barcode_scan_controller(&self) -> BarcodeScanController {
        BarcodeScanController::from_config(
            self.deps.scan_api.clone(),
            self.deps.navigator.clone(),
            &self.config,
        )
    }

    pub fn label_analysis(&self) -> LabelAnalysis {
        LabelAnalysis::new(
            self.deps.scan_api.clone(),
            self.deps.clock.clone(),
            PollPolicy::from_config(&self.config),
        )
    }

    pub fn resume_label_analysis(&self, scan_id: ScanId) -> LabelAnalysis {
        LabelAnalysis::resume(
            self.deps.scan_api.clone(),
            self.deps.clock.clone(),
            PollPolicy::from_config(&self.config),
            scan_id,
        )
    }
}

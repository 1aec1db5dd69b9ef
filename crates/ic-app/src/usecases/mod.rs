//! Scan use cases
//!
//! [camera callback] -> BarcodeScanController::handle_scan
//!                        |-- BarcodeAnalysis (fetch product, concurrent)
//!                        `-- debounced push -> NavigationPort
//!
//! [label photos]    -> LabelAnalysis::submit_image -> LabelAnalysis::analyze (poll loop)

pub mod barcode_scan;
pub mod label_analysis;
pub mod navigation;

pub use barcode_scan::{BarcodeAnalysis, BarcodeScanController, ScanDisposition};
pub use label_analysis::{
    poll_until_done, LabelAnalysis, LabelAnalysisError, PollOutcome, PollPolicy,
};
pub use navigation::{NavigationEntry, NavigationPort, NavigationStack};

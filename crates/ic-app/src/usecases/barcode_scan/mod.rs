//! Barcode flow: camera detections -> de-duplicated, debounced navigation.
//! 条形码流程：摄像头识别 -> 去重、防抖导航。

mod analysis;
mod controller;

pub use analysis::BarcodeAnalysis;
pub use controller::{BarcodeScanController, ScanDisposition};

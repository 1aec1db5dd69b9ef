//! IngrediCheck Application Orchestration Layer
//!
//! This crate contains the scan coordination use cases: the barcode scan
//! controller with its debounced navigation, the per-barcode analysis
//! view-model, and the label photo analysis with its polling loop.

pub mod deps;
pub mod usecase_factory;
pub mod usecases;

pub use deps::AppDeps;
pub use usecase_factory::ScanUseCases;
pub use usecases::{
    BarcodeAnalysis, BarcodeScanController, LabelAnalysis, LabelAnalysisError, NavigationEntry,
    NavigationPort, NavigationStack, PollOutcome, PollPolicy, ScanDisposition,
};

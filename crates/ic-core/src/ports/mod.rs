//! Port interfaces for the application layer
//!
//! Ports define the contract between the scan use cases and the
//! infrastructure implementations, so the coordination logic can be tested
//! against fakes and stays independent of the HTTP stack.
//!
//! ## Port Placement Guidelines
//!
//! A port lives in `ic-core/ports` when it represents a business capability,
//! is used by more than one use case, and is implemented by infrastructure.
//! Otherwise it belongs next to the use case that needs it.

mod clock;
pub mod errors;
pub mod scan_api;

pub use clock::*;
pub use errors::ScanApiError;
pub use scan_api::{ScanApiPort, ScanStatus, SubmitReceipt};

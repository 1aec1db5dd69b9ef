//! Scan session domain: session model, lifecycle state machine and the
//! on-screen bounds of a detected code.

mod bounds;
mod session;
mod state_machine;

pub use bounds::ScanBounds;
pub use session::{ScanFailure, ScanSession};
pub use state_machine::{InvalidTransition, ScanEvent, ScanState};

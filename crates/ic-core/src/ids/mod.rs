//! ID type wrappers for type safety.

pub mod barcode;
pub mod scan_id;

pub use barcode::{Barcode, BarcodeError};
pub use scan_id::ScanId;

//! # ic-infra
//!
//! Adapters for the ports defined in `ic-core`: the reqwest-based scan
//! backend client and the system clock.

pub mod http;
pub mod time;

pub use http::HttpScanApi;
pub use time::SystemClock;

//! HTTP adapter for [`ic_core::ports::ScanApiPort`].
//! 扫描后端的 HTTP 适配器。

mod client;
mod dto;

pub use client::HttpScanApi;

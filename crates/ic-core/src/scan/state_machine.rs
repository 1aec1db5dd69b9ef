//! Scan lifecycle state machine.
//!
//! Pure transition function shared by the barcode and photo flows:
//!
//! ```text
//! Idle -> Capturing -> Analyzing -> Done
//!   \__________\__________\-----> Error
//! ```
//!
//! `Done` and `Error` are terminal. A new scan always starts a new session.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Scan lifecycle state.
///
/// 扫描生命周期状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanState {
    /// Session created, nothing captured yet.
    ///
    /// 会话已创建，尚未采集。
    Idle,
    /// Camera is capturing label photos.
    ///
    /// 正在采集标签照片。
    Capturing,
    /// Backend analysis in flight.
    ///
    /// 后端分析进行中。
    Analyzing,
    /// Backend reported a completed analysis.
    ///
    /// 分析完成。
    Done,
    /// Analysis failed; terminal for this session.
    ///
    /// 分析失败（终态）。
    Error,
}

/// Events that drive the scan lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanEvent {
    /// Photo flow: the capture screen opened.
    CaptureStarted,
    /// Barcode accepted, or first label photo accepted by the backend.
    AnalysisStarted,
    /// Backend reported `done` with a populated result.
    Completed,
    /// Not found or transport failure.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid scan transition from {from:?} on {event:?}")]
pub struct InvalidTransition {
    pub from: ScanState,
    pub event: ScanEvent,
}

impl ScanState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ScanState::Done | ScanState::Error)
    }

    /// Compute the next state for `event`.
    pub fn apply(self, event: ScanEvent) -> Result<ScanState, InvalidTransition> {
        use ScanEvent as E;
        use ScanState as S;

        let next = match (self, event) {
            (S::Idle, E::CaptureStarted) => S::Capturing,
            (S::Idle | S::Capturing, E::AnalysisStarted) => S::Analyzing,
            // Further photos of the same label keep the session analyzing.
            (S::Analyzing, E::AnalysisStarted) => S::Analyzing,
            (S::Analyzing, E::Completed) => S::Done,
            (S::Idle | S::Capturing | S::Analyzing, E::Failed) => S::Error,
            (from, event) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(?from, ?event, "rejected scan state transition");
                return Err(InvalidTransition { from, event });
            }
        };
        Ok(next)
    }
}

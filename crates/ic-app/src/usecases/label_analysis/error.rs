use ic_core::ports::ScanApiError;
use ic_core::ScanId;

/// Errors returned by [`super::LabelAnalysis`] operations.
#[derive(Debug, thiserror::Error)]
pub enum LabelAnalysisError {
    #[error("image is empty")]
    EmptyImage,

    #[error("no image has been submitted for scan {0}")]
    NothingSubmitted(ScanId),

    #[error("scan {0} already finished")]
    SessionClosed(ScanId),

    #[error(transparent)]
    Api(#[from] ScanApiError),
}

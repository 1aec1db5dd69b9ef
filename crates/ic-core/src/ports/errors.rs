use thiserror::Error;

/// Errors returned by the scan backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanApiError {
    /// Barcode or scan id unknown to the backend.
    #[error("not found")]
    NotFound,

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid response: {0}")]
    Decode(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ScanApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ScanApiError::NotFound)
    }
}

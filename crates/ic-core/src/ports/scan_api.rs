//! Backend contract for scan submission and status queries.
//! 扫描后端接口约定。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::errors::ScanApiError;
use crate::ids::{Barcode, ScanId};
use crate::product::{IngredientRecommendation, Product, ProductAnalysis};

/// Backend state string that marks a finished scan job.
pub const SCAN_STATE_DONE: &str = "done";

/// Acknowledgement for an uploaded label photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitReceipt {
    pub queued: bool,
    pub queue_position: u32,
}

/// Snapshot of a server-side scan job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStatus {
    /// Raw backend state, `"done"` once the job finished.
    pub state: String,
    pub product: Option<Product>,
    /// Present once the ingredient analysis finished.
    pub recommendations: Option<Vec<IngredientRecommendation>>,
    pub guidance: Option<String>,
}

impl ScanStatus {
    pub fn is_done(&self) -> bool {
        self.state == SCAN_STATE_DONE
    }

    /// Done and carrying an analysis result; the only exit of the poll loop.
    pub fn is_complete(&self) -> bool {
        self.is_done() && self.recommendations.is_some()
    }
}

/// Scan backend port.
///
/// Implementations must be cancel-safe: dropping a returned future aborts the
/// request without side effects on the client.
#[async_trait]
pub trait ScanApiPort: Send + Sync {
    /// Upload one label photo for `scan_id`.
    async fn submit_image(
        &self,
        scan_id: &ScanId,
        image: Vec<u8>,
    ) -> Result<SubmitReceipt, ScanApiError>;

    /// Fetch the current status of the scan job.
    async fn get_scan(&self, scan_id: &ScanId) -> Result<ScanStatus, ScanApiError>;

    /// Look up a product by barcode, with recommendations when available.
    async fn fetch_product(&self, barcode: &Barcode) -> Result<ProductAnalysis, ScanApiError>;
}

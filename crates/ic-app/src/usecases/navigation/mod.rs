//! Navigation seam between the scan controller and the host UI.
//! 扫描控制器与宿主界面之间的导航接口。

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ic_core::Barcode;
use tokio::sync::watch;
use tracing::debug;

use crate::usecases::barcode_scan::BarcodeAnalysis;

/// A pushed product detail screen: the barcode plus the analysis that was
/// started for it. The entry owns the analysis from the moment it is pushed.
#[derive(Clone)]
pub struct NavigationEntry {
    pub barcode: Barcode,
    pub analysis: Arc<BarcodeAnalysis>,
}

impl std::fmt::Debug for NavigationEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationEntry")
            .field("barcode", &self.barcode)
            .field("scan_id", &self.analysis.scan_id())
            .finish()
    }
}

/// Navigation stack as seen by the scan controller.
pub trait NavigationPort: Send + Sync {
    fn push(&self, entry: NavigationEntry);

    /// Barcode of the entry currently on top of the stack, if any.
    fn top_barcode(&self) -> Option<Barcode>;
}

/// In-memory navigation stack.
///
/// Publishes its depth through a watch channel so hosts can wait for pushes.
pub struct NavigationStack {
    entries: Mutex<Vec<NavigationEntry>>,
    depth_tx: watch::Sender<usize>,
}

impl NavigationStack {
    pub fn new() -> Self {
        let (depth_tx, _) = watch::channel(0);
        Self {
            entries: Mutex::new(Vec::new()),
            depth_tx,
        }
    }

    fn entries(&self) -> MutexGuard<'_, Vec<NavigationEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn pop(&self) -> Option<NavigationEntry> {
        let mut entries = self.entries();
        let popped = entries.pop();
        self.depth_tx.send_replace(entries.len());
        popped
    }

    pub fn top(&self) -> Option<NavigationEntry> {
        self.entries().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    pub fn barcodes(&self) -> Vec<Barcode> {
        self.entries().iter().map(|e| e.barcode.clone()).collect()
    }

    /// Receiver that observes the stack depth.
    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.depth_tx.subscribe()
    }
}

impl Default for NavigationStack {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigationPort for NavigationStack {
    fn push(&self, entry: NavigationEntry) {
        let mut entries = self.entries();
        debug!(barcode = %entry.barcode, depth = entries.len() + 1, "navigation push");
        entries.push(entry);
        self.depth_tx.send_replace(entries.len());
    }

    fn top_barcode(&self) -> Option<Barcode> {
        self.entries().last().map(|e| e.barcode.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ic_core::ports::{ScanApiError, ScanApiPort, ScanStatus, SubmitReceipt};
    use ic_core::{ProductAnalysis, ScanId};

    struct UnusedApi;

    #[async_trait]
    impl ScanApiPort for UnusedApi {
        async fn submit_image(
            &self,
            _scan_id: &ScanId,
            _image: Vec<u8>,
        ) -> Result<SubmitReceipt, ScanApiError> {
            unreachable!("not used by navigation tests")
        }

        async fn get_scan(&self, _scan_id: &ScanId) -> Result<ScanStatus, ScanApiError> {
            unreachable!("not used by navigation tests")
        }

        async fn fetch_product(&self, _barcode: &Barcode) -> Result<ProductAnalysis, ScanApiError> {
            unreachable!("not used by navigation tests")
        }
    }

    fn entry(code: &str) -> NavigationEntry {
        let barcode = Barcode::parse(code).unwrap();
        NavigationEntry {
            barcode: barcode.clone(),
            analysis: BarcodeAnalysis::new(Arc::new(UnusedApi), barcode),
        }
    }

    #[test]
    fn test_top_barcode_tracks_last_push() {
        let stack = NavigationStack::new();
        assert_eq!(stack.top_barcode(), None);

        stack.push(entry("0123456789012"));
        stack.push(entry("4006381333931"));

        assert_eq!(stack.len(), 2);
        assert_eq!(stack.top_barcode().unwrap().as_str(), "4006381333931");

        stack.pop();
        assert_eq!(stack.top_barcode().unwrap().as_str(), "0123456789012");
    }

    #[test]
    fn test_subscribe_observes_depth() {
        let stack = NavigationStack::new();
        let rx = stack.subscribe();

        stack.push(entry("0123456789012"));
        assert_eq!(*rx.borrow(), 1);

        stack.pop();
        assert_eq!(*rx.borrow(), 0);
        assert!(stack.is_empty());
    }
}

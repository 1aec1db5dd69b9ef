use std::sync::{Arc, Mutex, PoisonError};

use ic_core::ports::{ScanApiError, ScanApiPort};
use ic_core::{Barcode, ScanEvent, ScanFailure, ScanId, ScanSession};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};

/// In-flight analysis of one barcode.
///
/// Started by the scan controller as soon as a barcode is accepted and handed
/// to the product detail screen when navigation fires. Errors (including
/// "not found") are recorded on the session for the screen to render; they
/// are never retried.
///
/// Dropping the last handle cancels the request.
pub struct BarcodeAnalysis {
    barcode: Barcode,
    api: Arc<dyn ScanApiPort>,
    session_tx: Arc<watch::Sender<ScanSession>>,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl BarcodeAnalysis {
    pub fn new(api: Arc<dyn ScanApiPort>, barcode: Barcode) -> Arc<Self> {
        let (session_tx, _) = watch::channel(ScanSession::for_barcode(barcode.clone()));
        Arc::new(Self {
            barcode,
            api,
            session_tx: Arc::new(session_tx),
            cancel: CancellationToken::new(),
            task: Mutex::new(None),
        })
    }

    pub fn barcode(&self) -> &Barcode {
        &self.barcode
    }

    pub fn scan_id(&self) -> ScanId {
        self.session_tx.borrow().scan_id.clone()
    }

    /// Current snapshot of the session.
    pub fn session(&self) -> ScanSession {
        self.session_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ScanSession> {
        self.session_tx.subscribe()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Start the backend lookup. Calling it again is a no-op.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self) {
        let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        if task.is_some() || self.cancel.is_cancelled() {
            return;
        }

        self.session_tx.send_modify(|session| {
            if let Err(err) = session.apply(ScanEvent::AnalysisStarted) {
                warn!(error = %err, "barcode session could not enter analyzing");
            }
        });

        let span = info_span!(
            "usecase.barcode_analysis.run",
            barcode = %self.barcode,
            scan_id = %self.session_tx.borrow().scan_id,
        );
        let future = Self::run(
            self.api.clone(),
            self.barcode.clone(),
            self.session_tx.clone(),
            self.cancel.clone(),
        );
        *task = Some(tokio::spawn(future.instrument(span)));
    }

    /// Cancel the lookup. Silent: the session keeps its current state.
    pub fn cancel(&self) {
        if !self.cancel.is_cancelled() {
            debug!(barcode = %self.barcode, "cancelling barcode analysis");
        }
        self.cancel.cancel();
    }

    /// Wait until the session reaches a terminal state or the analysis is
    /// cancelled, and return the final snapshot.
    pub async fn settled(&self) -> ScanSession {
        let mut rx = self.session_tx.subscribe();
        loop {
            let snapshot = rx.borrow_and_update().clone();
            if snapshot.state.is_terminal() || self.cancel.is_cancelled() {
                return snapshot;
            }
            tokio::select! {
                _ = self.cancel.cancelled() => {}
                changed = rx.changed() => {
                    if changed.is_err() {
                        return self.session();
                    }
                }
            }
        }
    }

    async fn run(
        api: Arc<dyn ScanApiPort>,
        barcode: Barcode,
        session_tx: Arc<watch::Sender<ScanSession>>,
        cancel: CancellationToken,
    ) {
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("barcode analysis cancelled before response");
                return;
            }
            result = api.fetch_product(&barcode) => result,
        };

        if cancel.is_cancelled() {
            debug!("barcode analysis cancelled, dropping response");
            return;
        }

        session_tx.send_modify(|session| {
            let outcome = match result {
                Ok(analysis) => {
                    let recommendations = analysis.recommendations.unwrap_or_default();
                    info!(
                        product = analysis.product.display_name(),
                        recommendations = recommendations.len(),
                        "barcode analysis completed"
                    );
                    session.product = Some(analysis.product);
                    session.complete(recommendations)
                }
                Err(ScanApiError::NotFound) => {
                    info!("no product found for barcode");
                    session.fail(ScanFailure::NotFound)
                }
                Err(err) => {
                    warn!(error = %err, "barcode analysis failed");
                    session.fail(ScanFailure::transport(err.to_string()))
                }
            };
            if let Err(err) = outcome {
                warn!(error = %err, "barcode session rejected analysis outcome");
            }
        });
    }
}

impl Drop for BarcodeAnalysis {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for BarcodeAnalysis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BarcodeAnalysis")
            .field("barcode", &self.barcode)
            .field("state", &self.session_tx.borrow().state)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ic_core::ports::{ScanStatus, SubmitReceipt};
    use ic_core::{Product, ProductAnalysis, ScanState};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Mock backend answering the barcode lookup with a fixed result.
    struct MockProductApi {
        calls: AtomicUsize,
        delay: Duration,
        result: Result<ProductAnalysis, ScanApiError>,
    }

    impl MockProductApi {
        fn new(result: Result<ProductAnalysis, ScanApiError>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                delay: Duration::ZERO,
                result,
            }
        }

        fn slow(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }
    }

    #[async_trait]
    impl ScanApiPort for MockProductApi {
        async fn submit_image(
            &self,
            _scan_id: &ScanId,
            _image: Vec<u8>,
        ) -> Result<SubmitReceipt, ScanApiError> {
            unreachable!("barcode analysis never uploads images")
        }

        async fn get_scan(&self, _scan_id: &ScanId) -> Result<ScanStatus, ScanApiError> {
            unreachable!("barcode analysis never polls")
        }

        async fn fetch_product(&self, _barcode: &Barcode) -> Result<ProductAnalysis, ScanApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.result.clone()
        }
    }

    fn barcode() -> Barcode {
        Barcode::parse("0123456789012").unwrap()
    }

    #[tokio::test]
    async fn test_successful_lookup_completes_session() {
        let api = Arc::new(MockProductApi::new(Ok(ProductAnalysis {
            product: Product {
                name: Some("Oat Bar".to_string()),
                ..Default::default()
            },
            recommendations: Some(Vec::new()),
        })));
        let analysis = BarcodeAnalysis::new(api.clone(), barcode());

        analysis.start();
        assert_eq!(analysis.session().state, ScanState::Analyzing);

        let session = analysis.settled().await;
        assert_eq!(session.state, ScanState::Done);
        assert_eq!(session.product.unwrap().display_name(), "Oat Bar");
        assert_eq!(session.recommendations, Some(Vec::new()));
        assert_eq!(api.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_recommendations_complete_as_empty() {
        let api = Arc::new(MockProductApi::new(Ok(ProductAnalysis::default())));
        let analysis = BarcodeAnalysis::new(api, barcode());

        analysis.start();
        let session = analysis.settled().await;

        assert!(session.is_done());
        assert_eq!(session.recommendations, Some(Vec::new()));
    }

    #[tokio::test]
    async fn test_not_found_is_distinct_failure() {
        let api = Arc::new(MockProductApi::new(Err(ScanApiError::NotFound)));
        let analysis = BarcodeAnalysis::new(api, barcode());

        analysis.start();
        let session = analysis.settled().await;

        assert_eq!(session.state, ScanState::Error);
        assert!(session.is_not_found());
    }

    #[tokio::test]
    async fn test_transport_error_is_recorded() {
        let api = Arc::new(MockProductApi::new(Err(ScanApiError::Transport(
            "connection reset".to_string(),
        ))));
        let analysis = BarcodeAnalysis::new(api, barcode());

        analysis.start();
        let session = analysis.settled().await;

        assert_eq!(
            session.error,
            Some(ScanFailure::transport("transport error: connection reset"))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_response_leaves_session_analyzing() {
        let api = Arc::new(
            MockProductApi::new(Ok(ProductAnalysis::default())).slow(Duration::from_secs(5)),
        );
        let analysis = BarcodeAnalysis::new(api.clone(), barcode());

        analysis.start();
        tokio::time::sleep(Duration::from_millis(100)).await;
        analysis.cancel();
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert!(analysis.is_cancelled());
        let session = analysis.settled().await;
        assert_eq!(session.state, ScanState::Analyzing);
        assert!(session.product.is_none());
        assert_eq!(api.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let api = Arc::new(MockProductApi::new(Ok(ProductAnalysis::default())));
        let analysis = BarcodeAnalysis::new(api.clone(), barcode());

        analysis.start();
        analysis.start();
        analysis.settled().await;

        assert_eq!(api.calls.load(Ordering::SeqCst), 1);
    }
}

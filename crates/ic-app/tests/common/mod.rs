#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use ic_core::ports::{ClockPort, ScanApiError, ScanApiPort, ScanStatus, SubmitReceipt};
use ic_core::{Barcode, Product, ProductAnalysis, ScanId};

/// Scan backend fake with call counters and scripted responses.
pub struct FakeScanApi {
    pub fetch_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
    pub submit_calls: AtomicUsize,
    fetch_delay: Duration,
    fetch_result: Result<ProductAnalysis, ScanApiError>,
    statuses: Mutex<VecDeque<Result<ScanStatus, ScanApiError>>>,
}

impl FakeScanApi {
    pub fn new() -> Self {
        Self {
            fetch_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            submit_calls: AtomicUsize::new(0),
            fetch_delay: Duration::from_millis(300),
            fetch_result: Ok(ProductAnalysis {
                product: Product {
                    name: Some("Peanut Butter Cups".to_string()),
                    ..Default::default()
                },
                recommendations: Some(Vec::new()),
            }),
            statuses: Mutex::new(VecDeque::new()),
        }
    }

    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = delay;
        self
    }

    pub fn with_fetch_result(mut self, result: Result<ProductAnalysis, ScanApiError>) -> Self {
        self.fetch_result = result;
        self
    }

    pub fn with_statuses(self, statuses: Vec<Result<ScanStatus, ScanApiError>>) -> Self {
        *self.statuses.lock().unwrap() = statuses.into();
        self
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScanApiPort for FakeScanApi {
    async fn submit_image(
        &self,
        _scan_id: &ScanId,
        _image: Vec<u8>,
    ) -> Result<SubmitReceipt, ScanApiError> {
        let position = self.submit_calls.fetch_add(1, Ordering::SeqCst) as u32;
        Ok(SubmitReceipt {
            queued: true,
            queue_position: position,
        })
    }

    async fn get_scan(&self, _scan_id: &ScanId) -> Result<ScanStatus, ScanApiError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(processing()))
    }

    async fn fetch_product(&self, _barcode: &Barcode) -> Result<ProductAnalysis, ScanApiError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.fetch_delay).await;
        self.fetch_result.clone()
    }
}

/// Clock that follows Tokio's (pausable) clock.
pub struct TokioClock {
    origin: tokio::time::Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        Self {
            origin: tokio::time::Instant::now(),
        }
    }
}

impl ClockPort for TokioClock {
    fn now_ms(&self) -> i64 {
        self.origin.elapsed().as_millis() as i64
    }
}

pub fn processing() -> ScanStatus {
    ScanStatus {
        state: "processing".to_string(),
        guidance: Some("Reading ingredients".to_string()),
        ..Default::default()
    }
}

pub fn done() -> ScanStatus {
    ScanStatus {
        state: "done".to_string(),
        product: Some(Product {
            name: Some("Trail Mix".to_string()),
            ..Default::default()
        }),
        recommendations: Some(Vec::new()),
        guidance: None,
    }
}

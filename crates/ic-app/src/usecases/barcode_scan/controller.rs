//! Barcode scan controller.
//!
//! Turns camera-rate barcode detections into at most one navigation per
//! distinct barcode:
//!
//! 1. A detection is ignored while another one is being processed, or when
//!    its barcode is already the top navigation entry.
//! 2. An accepted detection starts the backend lookup immediately and a
//!    debounce timer (1 s by default) that shows the success overlay.
//! 3. When the timer fires the product screen is pushed with the in-flight
//!    analysis and the controller becomes idle again.
//!
//! Cancelling the timer (superseded, or the scanner screen went away) also
//! cancels its analysis; nothing is pushed.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use ic_core::config::ScanConfig;
use ic_core::ports::ScanApiPort;
use ic_core::{Barcode, ScanBounds};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, Instrument};

use super::analysis::BarcodeAnalysis;
use crate::usecases::navigation::{NavigationEntry, NavigationPort};

/// What the controller did with one detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanDisposition {
    Accepted,
    /// Another detection is still inside its debounce window.
    IgnoredBusy,
    /// The barcode is already shown on top of the navigation stack.
    IgnoredAlreadyDisplayed,
    /// The detection carried no payload.
    IgnoredEmpty,
}

struct PendingNavigation {
    cancel: CancellationToken,
    // Dropping the handle detaches the task; cancellation goes through the token.
    _handle: JoinHandle<()>,
}

#[derive(Default)]
struct ControllerState {
    is_processing_barcode: bool,
    scan_bounds: ScanBounds,
    /// Bumped on every accepted scan and every reset. A debounce task only
    /// pushes if the generation it was started with is still current.
    generation: u64,
    pending_navigation: Option<PendingNavigation>,
    active_analysis: Option<Arc<BarcodeAnalysis>>,
}

/// Barcode scan controller, owned by the scanner screen.
///
/// `handle_scan` is synchronous so it can be called straight from the camera
/// callback, but it spawns Tokio tasks and must run inside a runtime.
pub struct BarcodeScanController {
    api: Arc<dyn ScanApiPort>,
    navigator: Arc<dyn NavigationPort>,
    debounce: Duration,
    state: Arc<Mutex<ControllerState>>,
}

impl BarcodeScanController {
    pub fn new(
        api: Arc<dyn ScanApiPort>,
        navigator: Arc<dyn NavigationPort>,
        debounce: Duration,
    ) -> Self {
        Self {
            api,
            navigator,
            debounce,
            state: Arc::new(Mutex::new(ControllerState::default())),
        }
    }

    pub fn from_config(
        api: Arc<dyn ScanApiPort>,
        navigator: Arc<dyn NavigationPort>,
        config: &ScanConfig,
    ) -> Self {
        Self::new(api, navigator, config.debounce())
    }

    fn lock_state(state: &Mutex<ControllerState>) -> MutexGuard<'_, ControllerState> {
        state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Handle one barcode detection from the camera.
    pub fn handle_scan(&self, raw_barcode: &str, view_bounds: ScanBounds) -> ScanDisposition {
        let mut state = Self::lock_state(&self.state);

        if state.is_processing_barcode {
            return ScanDisposition::IgnoredBusy;
        }

        let barcode = match Barcode::parse(raw_barcode) {
            Ok(barcode) => barcode,
            Err(err) => {
                debug!(error = %err, "ignoring empty detection");
                return ScanDisposition::IgnoredEmpty;
            }
        };

        if self.navigator.top_barcode().as_ref() == Some(&barcode) {
            return ScanDisposition::IgnoredAlreadyDisplayed;
        }

        state.is_processing_barcode = true;
        state.scan_bounds = view_bounds;
        state.generation += 1;
        let generation = state.generation;

        if let Some(previous) = state.pending_navigation.take() {
            previous.cancel.cancel();
        }
        if let Some(previous) = state.active_analysis.take() {
            previous.cancel();
        }

        let analysis = BarcodeAnalysis::new(self.api.clone(), barcode.clone());
        analysis.start();
        state.active_analysis = Some(analysis.clone());

        info!(
            barcode = %barcode,
            scan_id = %analysis.scan_id(),
            gtin = barcode.is_gtin(),
            check_digit_ok = barcode.has_valid_check_digit(),
            "barcode accepted"
        );

        let cancel = CancellationToken::new();
        let span = info_span!("usecase.barcode_scan.navigate", barcode = %barcode, generation);
        let task = Self::navigate_after_debounce(
            self.state.clone(),
            self.navigator.clone(),
            self.debounce,
            generation,
            cancel.clone(),
            NavigationEntry { barcode, analysis },
        );
        state.pending_navigation = Some(PendingNavigation {
            cancel,
            _handle: tokio::spawn(task.instrument(span)),
        });

        ScanDisposition::Accepted
    }

    /// Cancel the pending navigation and the analysis that has not been
    /// handed off yet, and reset to idle. Called when the scanner screen is
    /// dismantled.
    pub fn cancel_pending_operations(&self) {
        let mut state = Self::lock_state(&self.state);
        Self::reset(&mut state);
    }

    fn reset(state: &mut ControllerState) {
        if let Some(pending) = state.pending_navigation.take() {
            pending.cancel.cancel();
        }
        if let Some(analysis) = state.active_analysis.take() {
            analysis.cancel();
        }
        state.is_processing_barcode = false;
        state.scan_bounds = ScanBounds::ZERO;
        state.generation += 1;
    }

    pub fn is_processing_barcode(&self) -> bool {
        Self::lock_state(&self.state).is_processing_barcode
    }

    /// Bounds of the accepted barcode while its overlay is shown, zero otherwise.
    pub fn scan_bounds(&self) -> ScanBounds {
        Self::lock_state(&self.state).scan_bounds
    }

    /// Analysis started for the pending navigation, if any.
    pub fn active_analysis(&self) -> Option<Arc<BarcodeAnalysis>> {
        Self::lock_state(&self.state).active_analysis.clone()
    }

    pub fn has_pending_navigation(&self) -> bool {
        Self::lock_state(&self.state).pending_navigation.is_some()
    }

    async fn navigate_after_debounce(
        state: Arc<Mutex<ControllerState>>,
        navigator: Arc<dyn NavigationPort>,
        debounce: Duration,
        generation: u64,
        cancel: CancellationToken,
        entry: NavigationEntry,
    ) {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("navigation cancelled during debounce");
                entry.analysis.cancel();
                return;
            }
            _ = tokio::time::sleep(debounce) => {}
        }

        let mut state = Self::lock_state(&state);
        if cancel.is_cancelled() || state.generation != generation {
            debug!("navigation superseded after debounce");
            entry.analysis.cancel();
            return;
        }

        state.pending_navigation = None;
        // The pushed entry owns the analysis from here on.
        state.active_analysis = None;
        state.is_processing_barcode = false;
        state.scan_bounds = ScanBounds::ZERO;

        info!(barcode = %entry.barcode, "pushing product screen");
        navigator.push(entry);
    }
}

impl Drop for BarcodeScanController {
    fn drop(&mut self) {
        let mut state = Self::lock_state(&self.state);
        Self::reset(&mut state);
    }
}

impl std::fmt::Debug for BarcodeScanController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = Self::lock_state(&self.state);
        f.debug_struct("BarcodeScanController")
            .field("debounce", &self.debounce)
            .field("is_processing_barcode", &state.is_processing_barcode)
            .field("generation", &state.generation)
            .finish()
    }
}

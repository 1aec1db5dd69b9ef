use std::time::Duration;

use ic_app::{BarcodeScanController, NavigationStack, ScanDisposition};
use ic_core::ScanBounds;
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, warn, Instrument};

use super::report::print_session;
use super::Output;
use crate::bootstrap::AppServices;

/// Where a simulated detection sits in the camera preview.
const PREVIEW_BOUNDS: ScanBounds = ScanBounds {
    x: 60.0,
    y: 180.0,
    width: 240.0,
    height: 96.0,
};

pub async fn run(
    services: &AppServices,
    codes: &[String],
    interval_ms: u64,
    output: Output,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let controller = services.use_cases.barcode_scan_controller();
    let span = info_span!("cli.barcode", detections = codes.len());

    async {
        feed_detections(&controller, codes, Duration::from_millis(interval_ms), cancel).await;
        wait_for_navigation(&controller, &services.navigation, cancel).await;

        if cancel.is_cancelled() {
            controller.cancel_pending_operations();
            warn!("barcode scan cancelled");
        }

        // Entries come off the stack newest first; report them in push order.
        let mut entries = Vec::new();
        while let Some(entry) = services.navigation.pop() {
            entries.push(entry);
        }
        entries.reverse();
        if entries.is_empty() {
            info!("no product screen was opened");
        }

        for entry in entries {
            let session = tokio::select! {
                _ = cancel.cancelled() => {
                    entry.analysis.cancel();
                    entry.analysis.session()
                }
                session = entry.analysis.settled() => session,
            };
            print_session(&session, output)?;
        }
        Ok(())
    }
    .instrument(span)
    .await
}

async fn feed_detections(
    controller: &BarcodeScanController,
    codes: &[String],
    interval: Duration,
    cancel: &CancellationToken,
) {
    for (index, code) in codes.iter().enumerate() {
        if index > 0 {
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(interval) => {}
            }
        }
        let disposition = controller.handle_scan(code, PREVIEW_BOUNDS);
        match disposition {
            ScanDisposition::Accepted => info!(code = %code, "detection accepted"),
            other => info!(code = %code, disposition = ?other, "detection ignored"),
        }
    }
}

/// Wait until the accepted detection has been pushed.
///
/// The controller clears its pending navigation before pushing, so every
/// depth change is followed by a fresh `has_pending_navigation` check.
async fn wait_for_navigation(
    controller: &BarcodeScanController,
    navigation: &NavigationStack,
    cancel: &CancellationToken,
) {
    let mut depth = navigation.subscribe();
    while controller.has_pending_navigation() {
        tokio::select! {
            _ = cancel.cancelled() => return,
            changed = depth.changed() => {
                if changed.is_err() {
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::wire_dependencies;
    use ic_core::config::AppConfig;

    fn offline_services() -> AppServices {
        let mut config = AppConfig::default();
        // Nothing listens on the discard port; lookups fail fast.
        config.api.base_url = "http://127.0.0.1:9".to_string();
        wire_dependencies(&config).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_returns_once_detection_is_pushed() {
        let services = offline_services();
        let controller = services.use_cases.barcode_scan_controller();
        let started = tokio::time::Instant::now();

        assert_eq!(
            controller.handle_scan("0123456789012", PREVIEW_BOUNDS),
            ScanDisposition::Accepted
        );
        wait_for_navigation(&controller, &services.navigation, &CancellationToken::new()).await;

        assert_eq!(services.navigation.len(), 1);
        assert!(!controller.has_pending_navigation());
        assert!(started.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_without_detection_returns_immediately() {
        let services = offline_services();
        let controller = services.use_cases.barcode_scan_controller();
        let started = tokio::time::Instant::now();

        wait_for_navigation(&controller, &services.navigation, &CancellationToken::new()).await;

        assert!(services.navigation.is_empty());
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_stops_on_cancel() {
        let services = offline_services();
        let controller = services.use_cases.barcode_scan_controller();
        let cancel = CancellationToken::new();

        controller.handle_scan("0123456789012", PREVIEW_BOUNDS);
        cancel.cancel();
        wait_for_navigation(&controller, &services.navigation, &cancel).await;

        assert!(controller.has_pending_navigation());
        assert!(services.navigation.is_empty());
    }
}

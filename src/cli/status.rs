use anyhow::Context;
use ic_core::{ScanId, ScanState};
use tokio_util::sync::CancellationToken;
use tracing::{info_span, warn, Instrument};

use super::report::{print_session, print_status};
use super::Output;
use crate::bootstrap::AppServices;

pub async fn run(
    services: &AppServices,
    scan_id: &str,
    follow: bool,
    output: Output,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let scan_id = ScanId::from_string(scan_id.trim().to_string());
    if follow {
        return follow_scan(services, scan_id, output, cancel).await;
    }

    let status = services
        .scan_api
        .get_scan(&scan_id)
        .await
        .with_context(|| format!("Failed to fetch scan {scan_id}"))?;
    print_status(&status, output)
}

/// Attach to a scan uploaded earlier and poll it like a fresh label scan.
async fn follow_scan(
    services: &AppServices,
    scan_id: ScanId,
    output: Output,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let span = info_span!("cli.status.follow", scan_id = %scan_id);
    let analysis = services.use_cases.resume_label_analysis(scan_id);

    async {
        analysis.analyze()?;
        tokio::select! {
            _ = cancel.cancelled() => {
                analysis.cancel();
                warn!("following scan cancelled");
            }
            _ = analysis.wait() => {}
        }

        let session = analysis.session();
        print_session(&session, output)?;
        if session.state == ScanState::Error {
            anyhow::bail!("scan {} failed", session.scan_id);
        }
        Ok(())
    }
    .instrument(span)
    .await
}

use std::path::PathBuf;

use anyhow::Context;
use ic_core::ScanState;
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, warn, Instrument};

use super::report::print_session;
use super::Output;
use crate::bootstrap::AppServices;

pub async fn run(
    services: &AppServices,
    images: &[PathBuf],
    output: Output,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let analysis = services.use_cases.label_analysis();
    let span = info_span!("cli.label", scan_id = %analysis.scan_id(), images = images.len());

    async {
        for path in images {
            if cancel.is_cancelled() {
                warn!("label scan cancelled before upload finished");
                return Ok(());
            }
            let image = tokio::fs::read(path)
                .await
                .with_context(|| format!("Failed to read image: {}", path.display()))?;
            let receipt = analysis
                .submit_image(image)
                .await
                .with_context(|| format!("Failed to upload {}", path.display()))?;
            info!(
                path = %path.display(),
                queue_position = receipt.queue_position,
                "image uploaded"
            );
        }

        analysis.analyze()?;
        tokio::select! {
            _ = cancel.cancelled() => {
                analysis.cancel();
                warn!("label analysis cancelled");
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

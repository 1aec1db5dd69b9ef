//! Command line host driving the scan flows against a live backend.

mod barcode;
mod label;
mod report;
mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use crate::bootstrap::AppServices;

#[derive(Debug, Parser)]
#[command(name = "ingredicheck", version, about = "IngrediCheck scan client")]
pub struct Cli {
    /// Config file. Defaults to `<config dir>/ingredicheck/config.toml`.
    #[arg(long, global = true, env = "INGREDICHECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Debug logging for the scan crates.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print results as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Feed barcode detections into the scan controller, as a camera would.
    Barcode {
        /// Detected payloads, in order. Repeat a code to simulate a camera
        /// seeing it on consecutive frames.
        #[arg(required = true)]
        codes: Vec<String>,

        /// Delay between two detections.
        #[arg(long, default_value_t = 100)]
        interval_ms: u64,
    },
    /// Upload label photos and poll until the analysis is done.
    Label {
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },
    /// Fetch the current status of a scan.
    Status {
        scan_id: String,

        /// Keep polling until the analysis is done, like `label` does after
        /// uploading.
        #[arg(long)]
        follow: bool,
    },
}

/// Output options shared by all commands.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
}

pub async fn run(
    command: Command,
    services: AppServices,
    output: Output,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    match command {
        Command::Barcode { codes, interval_ms } => {
            barcode::run(&services, &codes, interval_ms, output, &cancel).await
        }
        Command::Label { images } => label::run(&services, &images, output, &cancel).await,
        Command::Status { scan_id, follow } => {
            status::run(&services, &scan_id, follow, output, &cancel).await
        }
    }
}

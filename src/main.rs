use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use ingredicheck_lib::bootstrap::{self, tracing::init_tracing_subscriber};
use ingredicheck_lib::cli::{self, Cli, Output};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine
    let _ = dotenvy::dotenv();

    let args = Cli::parse();
    init_tracing_subscriber(args.verbose)?;

    let config = bootstrap::resolve_config(args.config.as_deref())?;
    let services = bootstrap::wire_dependencies(&config)?;

    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("interrupt received, cancelling");
                ctrl_c_cancel.cancel();
            }
            Err(err) => error!(error = %err, "failed to listen for Ctrl-C"),
        }
    });

    let output = Output { json: args.json };
    let result = cli::run(args.command, services, output, cancel).await;
    if let Err(err) = &result {
        error!("command failed: {err:#}");
    } else {
        info!("done");
    }
    result
}

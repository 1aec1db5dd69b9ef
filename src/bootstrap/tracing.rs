//! Tracing configuration for the IngrediCheck host
//!
//! ## Behavior / 行为
//!
//! - **Development**: debug level for the workspace crates
//! - **Production**: info level
//! - **Environment filter**: `RUST_LOG` wins over the built-in directives
//! - **Writers**: stderr (stdout is reserved for command output), plus a
//!   daily-rotated file under the platform data dir when it can be created

use std::{fs, io, path::PathBuf, sync::OnceLock};

use anyhow::Context;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{fmt, fmt::writer::BoxMakeWriter, prelude::*, registry, EnvFilter};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

const LOG_FILE_PREFIX: &str = "ingredicheck.log";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

fn is_development() -> bool {
    cfg!(debug_assertions)
}

/// Build the default filter directives
///
/// `verbose` raises the workspace crates to debug in release builds.
fn build_filter_directives(is_dev: bool, verbose: bool) -> Vec<String> {
    let app_level = if is_dev || verbose { "debug" } else { "info" };
    vec![
        "warn".to_string(),
        format!("ingredicheck={app_level}"),
        format!("ingredicheck_lib={app_level}"),
        format!("ic_app={app_level}"),
        format!("ic_core={app_level}"),
        format!("ic_infra={app_level}"),
        "hyper=warn".to_string(),
        "reqwest=warn".to_string(),
    ]
}

/// Initialize the global tracing subscriber
///
/// Call once from `main`, after `.env` is loaded and before any use case
/// runs.
///
/// ## Errors / 错误
///
/// Returns `Err` if a subscriber is already registered.
pub fn init_tracing_subscriber(verbose: bool) -> anyhow::Result<()> {
    let filter_directives = build_filter_directives(is_development(), verbose);
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives.join(",")));

    let stderr_layer = fmt::layer()
        .with_timer(fmt::time::ChronoUtc::new(TIMESTAMP_FORMAT.to_string()))
        .with_level(true)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .with_ansi(cfg!(not(test)))
        .with_writer(BoxMakeWriter::new(io::stderr));

    let file_layer = match build_file_writer() {
        Ok(writer) => Some(
            fmt::layer()
                .with_timer(fmt::time::ChronoUtc::new(TIMESTAMP_FORMAT.to_string()))
                .with_level(true)
                .with_file(true)
                .with_line_number(true)
                .with_target(true)
                .with_ansi(false)
                .with_writer(writer),
        ),
        Err(err) => {
            eprintln!("File logging disabled: {err:#}");
            None
        }
    };

    registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to register tracing subscriber")?;

    Ok(())
}

/// `<platform data dir>/ingredicheck/logs`
pub fn logs_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("ingredicheck").join("logs"))
}

fn build_file_writer() -> anyhow::Result<NonBlocking> {
    let logs_dir = logs_dir().context("No platform data directory")?;
    fs::create_dir_all(&logs_dir)
        .with_context(|| format!("Failed to create log dir: {}", logs_dir.display()))?;

    let file_appender = tracing_appender::rolling::daily(&logs_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    LOG_GUARD
        .set(guard)
        .map_err(|_| anyhow::anyhow!("Tracing log guard already initialized"))?;

    Ok(non_blocking)
}

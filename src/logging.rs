//! File logging.
//!
//! The terminal belongs to the UI, so events go to `nback.log` instead.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Env var consulted before the CLI log level
pub const LOG_ENV: &str = "NBACK_LOG";

pub fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Install a subscriber appending to `dir/file_name`.
///
/// Keep the returned guard alive until exit, or buffered lines are lost.
pub fn init_file_logging(
    dir: &Path,
    file_name: &str,
    default_level: &str,
) -> std::io::Result<WorkerGuard> {
    std::fs::create_dir_all(dir)?;
    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let fmt_layer = fmt::layer()
        .with_writer(writer)
        .with_target(true)
        .with_level(true)
        .with_ansi(false);

    // a second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(env_filter(default_level))
        .with(fmt_layer)
        .try_init();

    tracing::info!(target: "nback::init", level = %default_level, "logging initialized");

    Ok(guard)
}

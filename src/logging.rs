//! Logging setup for the `bottango` binary
//!
//! Log lines go to stderr and are appended to a plain-text log file. The
//! library itself only emits `tracing` events.

use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::paths::AppPaths;

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over `level`. The returned guard flushes the
/// file writer on drop and must be held until the program ends.
pub fn init_logging(level: &str, logs_dir: &Path, file_name: &str) -> Result<WorkerGuard> {
    AppPaths::ensure_logs_dir(logs_dir)
        .with_context(|| format!("Failed to create logs directory: {}", logs_dir.display()))?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let file_appender = tracing_appender::rolling::never(logs_dir, file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_target(false),
        )
        .try_init()
        .context("Failed to install logging subscriber")?;

    Ok(guard)
}

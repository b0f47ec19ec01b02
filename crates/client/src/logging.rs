//! File logging for the terminal session.

use std::fs;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::dirs;

/// Installs a file-only subscriber writing to `<log dir>/<session>/encounter.log`.
///
/// Stdout belongs to the REPL, so nothing is logged to the terminal. The
/// returned guard flushes the writer when dropped and must live until exit.
pub fn setup(session: &str) -> Result<WorkerGuard> {
    let session_log_dir = dirs::log_dir().join(session);
    fs::create_dir_all(&session_log_dir).with_context(|| {
        format!("Failed to create log directory {}", session_log_dir.display())
    })?;

    let file_appender = tracing_appender::rolling::never(&session_log_dir, "encounter.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::info!(
        target: "cli",
        session,
        log_file = %session_log_dir.join("encounter.log").display(),
        "logging initialized"
    );
    Ok(guard)
}

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::LoggingConfig;

const LOG_FILE_PREFIX: &str = "voxbox-server.log";

/// Installs the global subscriber: console output plus an optional daily
/// rolling file.
///
/// Keep the returned guard alive until exit, or buffered file lines are lost.
///
/// # Errors
/// Returns an error for an invalid filter directive or when a subscriber is
/// already installed.
pub fn init(cfg: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cfg.level))
        .with_context(|| format!("invalid log level '{}'", cfg.level))?;

    let console = if cfg.json {
        fmt::layer().json().with_target(true).boxed()
    } else {
        fmt::layer().with_target(true).boxed()
    };

    let (file, guard) = match &cfg.file_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(guard)
}

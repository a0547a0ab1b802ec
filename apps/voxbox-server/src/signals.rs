use anyhow::Result;
use tokio::signal;

/// Waits for Ctrl+C or SIGTERM.
///
/// # Errors
/// Returns an error if a signal handler cannot be installed.
pub async fn wait_for_shutdown() -> Result<()> {
    tokio::select! {
        result = wait_ctrl_c() => result?,
        result = wait_sigterm() => result?,
    }
    tracing::info!("shutdown signal received, draining connections");
    Ok(())
}

async fn wait_ctrl_c() -> Result<()> {
    signal::ctrl_c().await.map_err(|e| {
        tracing::error!(%e, "error handling Ctrl+C signal");
        e
    })?;
    Ok(())
}

#[cfg(unix)]
async fn wait_sigterm() -> Result<()> {
    let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate()).map_err(|e| {
        tracing::error!(%e, "failed to install SIGTERM handler");
        e
    })?;
    sigterm.recv().await;
    Ok(())
}

#[cfg(not(unix))]
async fn wait_sigterm() -> Result<()> {
    std::future::pending::<Result<()>>().await
}

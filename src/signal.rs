//! Signal handling for graceful shutdown.

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Wait for a shutdown signal (SIGINT, SIGTERM, or SIGQUIT on Unix).
///
/// Returns the name of the signal received.
#[cfg(unix)]
pub async fn shutdown_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    let name = tokio::select! {
        _ = sigint.recv() => "SIGINT",
        _ = sigterm.recv() => "SIGTERM",
        _ = sigquit.recv() => "SIGQUIT",
    };
    Ok(name)
}

/// Wait for Ctrl-C.
#[cfg(not(unix))]
pub async fn shutdown_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("CTRL_C")
}

/// Cancel `shutdown` on the first shutdown signal.
///
/// If the handlers cannot be installed the process keeps serving and can
/// only be stopped by being killed.
pub fn cancel_on_signal(shutdown: CancellationToken) {
    tokio::spawn(async move {
        match shutdown_signal().await {
            Ok(signal) => {
                info!(message = "Signal received.", signal);
                shutdown.cancel();
            }
            Err(e) => error!(error = %e, "Failed to install signal handlers"),
        }
    });
}

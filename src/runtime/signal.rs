//! OS signal wiring: turns Ctrl-C / SIGTERM into cancellation of the run's root token.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Cancels `token` on the first shutdown signal. The watcher exits on its own once `token` is
/// cancelled by anything else.
pub(crate) fn spawn_signal_watcher(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            () = token.cancelled() => {}
            received = shutdown_signal() => match received {
                Ok(signal) => {
                    info!(signal, "Shutdown signal received");
                    token.cancel();
                }
                Err(err) => error!(error = %err, "Failed to listen for shutdown signals"),
            },
        }
    })
}

#[cfg(unix)]
async fn shutdown_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result.map(|()| "SIGINT"),
        _ = terminate.recv() => Ok("SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await.map(|()| "ctrl-c")
}

use tracing::info;

/// Resolve when the process is asked to stop
///
/// Listens for CTRL+C and, on Unix, SIGTERM. The caller decides what a
/// graceful stop means; this only reports the signal.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received CTRL+C signal, stopping...");
        }
        _ = terminate => {
            info!("Received SIGTERM signal, stopping...");
        }
    }
}

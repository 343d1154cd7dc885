// Signal handling module
//
// SIGINT (Ctrl+C) and SIGTERM stop accepting new connections; connections
// already being served finish in their own tasks.

use crate::logger;

/// Resolves once the process is asked to shut down
///
/// If no signal handler can be installed this never resolves, so the host
/// keeps serving rather than exiting immediately.
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => {
                logger::log_warning(&format!("Failed to register SIGTERM handler: {e}"));
                ctrl_c().await;
                return;
            }
        };

        tokio::select! {
            () = ctrl_c() => {}
            _ = sigterm.recv() => logger::log_info("[Signal] SIGTERM received, shutting down"),
        }
    }

    #[cfg(not(unix))]
    ctrl_c().await;
}

async fn ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => logger::log_info("[Signal] SIGINT received, shutting down"),
        Err(e) => {
            logger::log_warning(&format!("Failed to listen for Ctrl+C: {e}"));
            std::future::pending::<()>().await;
        }
    }
}

//! Process shutdown signals for the service binary.

use std::fmt::Display;
use std::future::{Future, pending};
use tracing::{info, warn};

/// Awaits a signal listener.
///
/// A listener that fails to install is logged and then never resolves, so
/// the remaining signals still govern shutdown.
pub async fn signal_or_never<F, E>(name: &str, listener: F)
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    if let Err(err) = listener.await {
        warn!(signal = name, error = %err, "failed to install signal handler, signal disabled");
        pending::<()>().await;
    }
}

/// Resolves when SIGINT (Ctrl-C) or, on Unix, SIGTERM is received.
pub async fn shutdown_signal() {
    let ctrl_c = signal_or_never("SIGINT", tokio::signal::ctrl_c());

    #[cfg(unix)]
    let terminate = signal_or_never("SIGTERM", async {
        use tokio::signal::unix::{SignalKind, signal};
        signal(SignalKind::terminate())?.recv().await;
        Ok::<(), std::io::Error>(())
    });

    #[cfg(not(unix))]
    let terminate = pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    info!("shutdown signal received");
}

use {super::*, tokio::signal::ctrl_c};

#[cfg(unix)]
async fn shutdown_signal() -> &'static str {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");

    tokio::select! {
        _ = ctrl_c() => "SIGINT",
        _ = sigterm.recv() => "SIGTERM",
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> &'static str {
    ctrl_c().await.ok();
    "Ctrl-C"
}

/// Cancelled on the first shutdown signal. A second Ctrl-C exits
/// without waiting for sessions to drain.
pub(crate) fn setup_signal_handler() -> CancellationToken {
    let cancel = CancellationToken::new();

    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            let signal = shutdown_signal().await;
            info!("Received {signal}, shutting down");
            cancel.cancel();

            if ctrl_c().await.is_ok() {
                warn!("Received second interrupt, exiting immediately");
                process::exit(130);
            }
        }
    });

    cancel
}

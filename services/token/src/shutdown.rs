//! Graceful shutdown.
//!
//! A single [`ShutdownTrigger`] fans out to any number of [`ShutdownSignal`]s,
//! one per server.

use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};

/// Fires the shutdown signal.
#[derive(Debug)]
pub struct ShutdownTrigger {
    sender: watch::Sender<bool>,
}

/// Resolves once shutdown has been triggered.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    receiver: watch::Receiver<bool>,
}

/// Creates a connected trigger/signal pair.
#[must_use]
pub fn channel() -> (ShutdownTrigger, ShutdownSignal) {
    let (sender, receiver) = watch::channel(false);
    (ShutdownTrigger { sender }, ShutdownSignal { receiver })
}

impl ShutdownTrigger {
    /// Signals every receiver. Idempotent.
    pub fn trigger(&self) {
        self.sender.send_replace(true);
    }
}

impl ShutdownSignal {
    /// Waits for the trigger. Also resolves if the trigger is dropped.
    pub async fn recv(mut self) {
        let _ = self.receiver.wait_for(|fired| *fired).await;
    }

    /// Checks if shutdown has been signaled (non-blocking)
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        *self.receiver.borrow()
    }
}

/// Waits for SIGTERM or SIGINT.
///
/// If a handler cannot be installed the failure is logged and that source
/// never fires.
pub async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, initiating shutdown"),
        () = terminate => info!("Received SIGTERM, initiating shutdown"),
    }
}

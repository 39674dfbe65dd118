//! Lifecycle management.
//!
//! A single watch channel carries the stop request to the scheduler and the
//! HTTP server. OS signals are one trigger; `main` sends it directly when the
//! server exits on its own.

use std::future::Future;
use std::io;

use tokio::sync::watch;
use tracing::{info, warn};

/// Owner of the shutdown channel
pub struct LifecycleManager {
    shutdown_tx: watch::Sender<bool>,
}

impl LifecycleManager {
    pub fn new() -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self { shutdown_tx }
    }

    /// Receiver that turns `true` once shutdown is requested
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }

    /// Broadcast shutdown. Repeated calls are no-ops.
    pub fn shutdown(&self) {
        let first = self.shutdown_tx.send_if_modified(|stopping| {
            let changed = !*stopping;
            *stopping = true;
            changed
        });
        if first {
            info!("sending shutdown signal");
        }
    }

    /// Broadcast shutdown once `trigger` completes
    pub async fn shutdown_on(&self, trigger: impl Future<Output = ()>) {
        trigger.await;
        self.shutdown();
    }

    /// Wait for SIGINT/SIGTERM (Ctrl+C off unix), then broadcast shutdown
    pub async fn wait_for_signal(&self) {
        self.shutdown_on(os_signal()).await;
    }
}

impl Default for LifecycleManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
async fn os_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match (
        signal(SignalKind::interrupt()),
        signal(SignalKind::terminate()),
    ) {
        (Ok(mut sigint), Ok(mut sigterm)) => {
            tokio::select! {
                _ = sigint.recv() => info!("SIGINT received"),
                _ = sigterm.recv() => info!("SIGTERM received"),
            }
        }
        (Err(e), _) | (_, Err(e)) => {
            warn!("failed to install signal handlers, falling back to Ctrl+C: {e}");
            ctrl_c(tokio::signal::ctrl_c()).await;
        }
    }
}

#[cfg(not(unix))]
async fn os_signal() {
    ctrl_c(tokio::signal::ctrl_c()).await;
}

/// Resolve when `listener` reports Ctrl+C. If it fails there is no signal
/// source left and this never resolves; the process runs until killed.
async fn ctrl_c(listener: impl Future<Output = io::Result<()>>) {
    match listener.await {
        Ok(()) => info!("Ctrl+C received"),
        Err(e) => {
            warn!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    }
}

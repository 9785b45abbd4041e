//! Run Cancellation Coordination
//!
//! A single cancellation signal shared by the fleet scan: raised by an explicit
//! stop (SIGINT/SIGTERM) or by the overall run timeout. Once raised the scan
//! stops dispatching new projects and drains in-flight work.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// Why the run was asked to stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    Signal,
    Timeout,
    Requested,
}

/// Coordinates graceful shutdown across the application
#[derive(Clone)]
pub struct ShutdownCoordinator {
    shutdown_tx: broadcast::Sender<ShutdownReason>,
    shutdown_requested: Arc<AtomicBool>,
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        let (shutdown_tx, _) = broadcast::channel(8);
        Self {
            shutdown_tx,
            shutdown_requested: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Subscribe to shutdown notifications
    pub fn subscribe(&self) -> broadcast::Receiver<ShutdownReason> {
        self.shutdown_tx.subscribe()
    }

    pub fn trigger_shutdown(&self, reason: ShutdownReason) {
        // Release pairs with the Acquire load in is_shutdown_requested
        let already = self.shutdown_requested.swap(true, Ordering::Release);
        if !already {
            log::info!("Cancellation requested ({:?})", reason);
        }
        let _ = self.shutdown_tx.send(reason);
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::Acquire)
    }

    /// Resolves once shutdown has been requested, including before the call
    pub async fn cancelled(&self) {
        let mut rx = self.subscribe();
        if self.is_shutdown_requested() {
            return;
        }
        loop {
            match rx.recv().await {
                Ok(_) => return,
                Err(broadcast::error::RecvError::Lagged(_)) => return,
                Err(broadcast::error::RecvError::Closed) => {
                    if self.is_shutdown_requested() {
                        return;
                    }
                    std::future::pending::<()>().await;
                }
            }
        }
    }

    /// Raise the signal with `ShutdownReason::Timeout` once `limit` elapses
    pub fn trigger_after(&self, limit: Duration) -> tokio::task::JoinHandle<()> {
        let coordinator = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(limit).await;
            log::warn!("Overall run timeout of {:?} reached", limit);
            coordinator.trigger_shutdown(ShutdownReason::Timeout);
        })
    }

    /// Install process signal handlers that raise the signal.
    /// A second signal exits immediately.
    pub fn install_signal_handlers(&self) {
        setup_signal_handlers(self.clone());
    }
}

fn setup_signal_handlers(coordinator: ShutdownCoordinator) {
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }

        use std::sync::atomic::AtomicUsize;
        use tokio::signal::unix::{signal, SignalKind};
        let signal_count = Arc::new(AtomicUsize::new(0));

        for kind in [SignalKind::interrupt(), SignalKind::terminate()] {
            let coordinator = coordinator.clone();
            let sig_ctr = signal_count.clone();

            tokio::spawn(async move {
                if let Ok(mut sig) = signal(kind) {
                    while sig.recv().await.is_some() {
                        let prev = sig_ctr.fetch_add(1, Ordering::AcqRel);
                        if prev >= 1 {
                            log::warn!("Second interrupt received; exiting");
                            std::process::exit(130);
                        }
                        coordinator.trigger_shutdown(ShutdownReason::Signal);
                    }
                }
            });
        }
    }

    #[cfg(not(unix))]
    {
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                coordinator.trigger_shutdown(ShutdownReason::Signal);
            }
        });
    }
}

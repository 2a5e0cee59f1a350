//! Cooperative shutdown signal.
//!
//! A single trigger (ctrl-c, admin stop, test harness) flips a watch
//! channel observed by every delivery worker and the run loop. In-flight
//! transport calls finish their current attempt; no new retries start
//! after the signal.

use tokio::sync::watch;

/// Create a linked trigger/observer pair.
#[must_use]
pub fn shutdown_channel() -> (ShutdownTrigger, Shutdown) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger { tx }, Shutdown { rx })
}

/// The triggering half; held by whoever decides to stop the process.
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

impl ShutdownTrigger {
    /// Signal shutdown to every observer.
    pub fn trigger(&self) {
        let _ = self.tx.send(true);
    }
}

/// Cloneable observer handed to workers and loops.
#[derive(Clone)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    /// Whether shutdown has been signalled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once shutdown is signalled.
    ///
    /// If the trigger is dropped without firing, this never resolves; the
    /// racing branch of the caller's `select!` proceeds instead.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow() {
                return;
            }
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

//! Cooperative shutdown coordination between the listener and its sessions.
//!
//! The server holds no references to running sessions. Instead every session
//! subscribes to a [`Notifier`] before it starts; `notify` wakes all
//! subscribers and `linger` resolves once the last subscriber has dropped its
//! [`Watcher`]. This keeps ownership acyclic: sessions own their sockets, the
//! notifier owns nothing but channel ends.

use tokio::sync::{Mutex, RwLock, broadcast, mpsc};

#[derive(Debug)]
pub(crate) struct Notifier {
    signal_tx: broadcast::Sender<()>,
    // Present until notify() runs. Each Watcher holds a clone; when the last
    // clone drops, the receiver below completes and linger() returns.
    complete_tx: RwLock<Option<mpsc::Sender<()>>>,
    complete_rx: Mutex<mpsc::Receiver<()>>,
}

impl Notifier {
    pub fn new() -> Notifier {
        let (signal_tx, _) = broadcast::channel(1);
        let (complete_tx, complete_rx) = mpsc::channel(1);
        Notifier {
            signal_tx,
            complete_tx: RwLock::new(Some(complete_tx)),
            complete_rx: Mutex::new(complete_rx),
        }
    }

    /// Registers interest in the shutdown signal. Subscribing after shutdown
    /// commenced yields a watcher that reports shutdown immediately.
    pub async fn subscribe(&self) -> Watcher {
        let complete_tx = self.complete_tx.read().await;
        Watcher {
            fired: complete_tx.is_none(),
            signal_rx: self.signal_tx.subscribe(),
            _complete_tx: complete_tx.clone(),
        }
    }

    /// Tells all subscribed sessions to wind down.
    pub async fn notify(&self) {
        let _ = self.signal_tx.send(());
        self.complete_tx.write().await.take();
    }

    /// Waits until every session that subscribed has finished.
    pub async fn linger(&self) {
        let _ = self.complete_rx.lock().await.recv().await;
    }
}

/// A session's view of the shutdown signal.
#[derive(Debug)]
pub(crate) struct Watcher {
    fired: bool,
    signal_rx: broadcast::Receiver<()>,
    _complete_tx: Option<mpsc::Sender<()>>,
}

impl Watcher {
    /// Resolves when shutdown commences. Returns immediately on subsequent
    /// calls once the signal has been seen.
    pub async fn wait(&mut self) {
        if self.fired {
            return;
        }
        // An error means the notifier is gone, which counts as shutdown too.
        let _ = self.signal_rx.recv().await;
        self.fired = true;
    }
}

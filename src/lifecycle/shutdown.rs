//! One-shot death notification for a running service.

use std::sync::Arc;
use tokio::sync::watch;

/// Latched, one-shot shutdown trigger.
///
/// Once triggered it stays triggered: watchers created before or after the
/// trigger both observe it, so a notification raised before anyone waits is
/// never lost.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

impl Shutdown {
    /// Create a new, untriggered shutdown trigger.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Get a handle that resolves once the trigger fires.
    pub fn watch(&self) -> DeathWatch {
        DeathWatch {
            rx: self.tx.subscribe(),
        }
    }

    /// Fire the trigger.
    ///
    /// Returns `true` only for the call that actually fired it.
    pub fn trigger(&self) -> bool {
        !self.tx.send_replace(true)
    }

    /// Whether the trigger has fired.
    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Read side of a [`Shutdown`] trigger.
#[derive(Debug)]
pub struct DeathWatch {
    rx: watch::Receiver<bool>,
}

impl DeathWatch {
    /// Wait until the trigger fires.
    ///
    /// Never resolves if every [`Shutdown`] handle is dropped without firing.
    pub async fn wait(mut self) {
        let closed = self.rx.wait_for(|dead| *dead).await.is_err();
        if closed {
            std::future::pending::<()>().await;
        }
    }

    /// Whether the trigger has already fired.
    pub fn is_dead(&self) -> bool {
        *self.rx.borrow()
    }
}

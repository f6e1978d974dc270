//! Cooperative shutdown signalling

use std::sync::Arc;
use tokio::sync::watch;

/// Handle for triggering shutdown
///
/// Cloning shares the same underlying flag; triggering any clone triggers all.
#[derive(Clone, Debug)]
pub struct ShutdownHandle {
    sender: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    /// Create a new, untriggered handle
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Trigger shutdown
    ///
    /// Returns `true` only for the call that actually flipped the flag.
    pub fn trigger(&self) -> bool {
        !self.sender.send_replace(true)
    }

    /// Check if shutdown has been triggered
    pub fn is_triggered(&self) -> bool {
        *self.sender.borrow()
    }

    /// Get a signal that tasks can wait on
    pub fn signal(&self) -> ShutdownSignal {
        ShutdownSignal {
            receiver: self.sender.subscribe(),
        }
    }
}

impl Default for ShutdownHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving side of a [`ShutdownHandle`]
#[derive(Clone, Debug)]
pub struct ShutdownSignal {
    receiver: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Check if shutdown has been triggered (non-blocking)
    pub fn is_triggered(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Wait until shutdown is triggered
    ///
    /// Returns immediately if already triggered. Dropping every handle counts
    /// as a trigger. Cancel-safe, so it can sit in a `select!` loop.
    pub async fn wait(&mut self) {
        let _ = self.receiver.wait_for(|triggered| *triggered).await;
    }
}

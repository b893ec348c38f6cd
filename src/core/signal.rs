//! # Completion signal.
//!
//! [`CompletionSignal`] is a one-shot latch over [`tokio::sync::watch`]: it goes
//! from unsignaled to signaled once and stays there. Waiting never consumes it,
//! so any number of readers may wait, before or after it is set.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

/// One-shot event set by the worker once it has fully stopped.
#[derive(Clone, Debug)]
pub struct CompletionSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl CompletionSignal {
    /// Creates an unsignaled latch.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Signals completion.
    ///
    /// Returns `true` only for the call that performed the transition.
    pub fn set(&self) -> bool {
        self.tx.send_if_modified(|done| {
            if *done {
                false
            } else {
                *done = true;
                true
            }
        })
    }

    /// Whether completion has been signalled.
    pub fn is_set(&self) -> bool {
        *self.tx.borrow()
    }

    /// Waits until completion is signalled.
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so this cannot observe a closed channel.
        let _ = rx.wait_for(|done| *done).await;
    }

    /// Waits up to `timeout`; returns whether completion was signalled in time.
    pub async fn wait_timeout(&self, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, self.wait()).await.is_ok()
    }
}

impl Default for CompletionSignal {
    fn default() -> Self {
        Self::new()
    }
}

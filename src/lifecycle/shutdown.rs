//! Cancellation coordination for a check run.

use tokio::sync::watch;

/// Coordinator for cancelling long-running work.
///
/// Holds a watch channel that any number of tasks can subscribe to.
pub struct Shutdown {
    /// Watch channel sender; `true` once triggered.
    tx: watch::Sender<bool>,
}

impl Shutdown {
    /// Create a new coordinator.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Subscribe to the cancellation signal.
    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: Some(self.tx.subscribe()),
        }
    }

    /// Trigger the cancellation signal.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    /// Number of live subscribers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving side of [`Shutdown`].
#[derive(Clone, Debug)]
pub struct ShutdownSignal {
    rx: Option<watch::Receiver<bool>>,
}

impl ShutdownSignal {
    /// A signal that never fires.
    pub fn never() -> Self {
        Self { rx: None }
    }

    pub fn is_triggered(&self) -> bool {
        self.rx.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Resolve once the signal fires. Pending forever for [`ShutdownSignal::never`]
    /// or when the coordinator is dropped without triggering.
    pub async fn triggered(&mut self) {
        match self.rx.as_mut() {
            Some(rx) => {
                let closed = rx.wait_for(|fired| *fired).await.is_err();
                if closed {
                    std::future::pending::<()>().await;
                }
            }
            None => std::future::pending::<()>().await,
        }
    }
}

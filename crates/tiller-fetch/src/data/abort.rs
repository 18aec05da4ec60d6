use std::sync::Arc;

use tokio::sync::watch;

/// Owner side of a cancellation handle.
///
/// The request layer never aborts on its own; it forwards the
/// [`AbortSignal`] to the transport, which decides how to stop.
#[derive(Debug, Clone)]
pub struct AbortController {
    tx: Arc<watch::Sender<bool>>,
}

impl AbortController {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// A signal observing this controller.
    pub fn signal(&self) -> AbortSignal {
        AbortSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Abort every request holding a signal from this controller. Idempotent.
    pub fn abort(&self) { self.tx.send_replace(true); }
}

impl Default for AbortController {
    fn default() -> Self { Self::new() }
}

/// Observer side of a cancellation handle.
#[derive(Debug, Clone)]
pub struct AbortSignal {
    rx: watch::Receiver<bool>,
}

impl AbortSignal {
    pub fn is_aborted(&self) -> bool { *self.rx.borrow() }

    /// Resolves once the controller aborts. Never resolves if every
    /// controller is dropped without aborting.
    pub async fn aborted(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|aborted| *aborted).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_signal_starts_clear() {
        let controller = AbortController::new();
        assert!(!controller.signal().is_aborted());
    }

    #[tokio::test]
    async fn test_abort_wakes_waiters() {
        let controller = AbortController::new();
        let signal = controller.signal();

        let waiter = tokio::spawn(async move { signal.aborted().await });
        controller.abort();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should wake")
            .unwrap();
    }

    #[tokio::test]
    async fn test_dropped_controller_never_aborts() {
        let signal = AbortController::new().signal();
        let waited = tokio::time::timeout(Duration::from_millis(20), signal.aborted()).await;
        assert!(waited.is_err());
        assert!(!signal.is_aborted());
    }
}

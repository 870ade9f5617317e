use std::future::Future;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

/// Lifetime of a view. Fetches started through a scope are cancelled when
/// the scope is cancelled or dropped, and then yield `None`.
pub struct ViewScope {
    cancel: watch::Sender<bool>,
}

impl Default for ViewScope {
    fn default() -> Self {
        Self::new()
    }
}

async fn cancelled(mut rx: watch::Receiver<bool>) {
    loop {
        let is_cancelled = *rx.borrow_and_update();
        if is_cancelled {
            return;
        }
        // Sender gone means the scope was dropped
        if rx.changed().await.is_err() {
            return;
        }
    }
}

async fn until_cancelled<F: Future>(rx: watch::Receiver<bool>, fut: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        _ = cancelled(rx) => {
            debug!("View fetch cancelled");
            None
        }
        out = fut => Some(out),
    }
}

impl ViewScope {
    pub fn new() -> Self {
        let (cancel, _) = watch::channel(false);
        Self { cancel }
    }

    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }

    /// Await `fut` unless the scope is cancelled first
    pub async fn run<F: Future>(&self, fut: F) -> Option<F::Output> {
        until_cancelled(self.cancel.subscribe(), fut).await
    }

    /// Run `fut` on the runtime, tied to this scope
    pub fn spawn<F>(&self, fut: F) -> JoinHandle<Option<F::Output>>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let rx = self.cancel.subscribe();
        tokio::spawn(until_cancelled(rx, fut))
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.cancel.send_replace(true);
    }
}

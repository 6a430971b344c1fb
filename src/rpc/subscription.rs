//! Cancellable handles for websocket subscriptions
//!
//! Every subscription runs in its own task. The handle owns a oneshot
//! sender; firing it (explicitly through [`Subscription::cancel`] or
//! implicitly on drop) tells the task to unsubscribe and exit.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

static NEXT_SUBSCRIPTION_ID: AtomicU64 = AtomicU64::new(1);

/// What a subscription listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscriptionKind {
    AccountChange,
    SlotChange,
}

/// Cancellation signal handed to a subscription task
pub type CancelSignal = oneshot::Receiver<()>;

/// Handle to a running subscription task
pub struct Subscription {
    id: u64,
    kind: SubscriptionKind,
    cancel: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Spawn `run` on the current tokio runtime.
    ///
    /// `run` receives the cancel signal and must return once it fires.
    pub fn spawn<F, Fut>(kind: SubscriptionKind, run: F) -> Self
    where
        F: FnOnce(CancelSignal) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let id = NEXT_SUBSCRIPTION_ID.fetch_add(1, Ordering::Relaxed);
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let task = tokio::spawn(run(cancel_rx));

        debug!(subscription_id = id, kind = ?kind, "Subscription started");

        Self {
            id,
            kind,
            cancel: Some(cancel_tx),
            task: Some(task),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> SubscriptionKind {
        self.kind
    }

    /// Whether the subscription task is still running
    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Signal cancellation and wait for the task to finish
    pub async fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }

        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    warn!(subscription_id = self.id, "Subscription task failed: {}", e);
                }
            }
        }

        debug!(subscription_id = self.id, kind = ?self.kind, "Subscription cancelled");
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("active", &self.is_active())
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
    }
}

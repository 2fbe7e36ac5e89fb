//! Cooperative cancellation shared between an owner and the tasks it spawned.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct CancellationState {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Cloneable flag that parked tasks can await
#[derive(Debug, Clone, Default)]
pub struct CancellationSignal {
    state: Arc<CancellationState>,
}

impl CancellationSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel and wake every waiter. Repeated calls are no-ops.
    pub fn cancel(&self) {
        if !self.state.cancelled.swap(true, Ordering::AcqRel) {
            self.state.notify.notify_waiters();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::Acquire)
    }

    /// Resolves once [`cancel`](Self::cancel) has been called
    pub async fn cancelled(&self) {
        loop {
            // Register before checking the flag so a concurrent cancel is not missed
            let notified = self.state.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

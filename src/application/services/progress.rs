use tokio::sync::watch;

use crate::domain::events::DispatchSnapshot;

/// Where the dispatcher publishes state updates. Purely observational;
/// implementations must never block the dispatch loop.
pub trait ProgressSink: Send + Sync {
    fn publish(&self, snapshot: DispatchSnapshot);
}

/// Production sink: a watch channel holding the latest snapshot. The
/// registry keeps the receiving side for the status endpoint.
pub struct WatchProgress {
    tx: watch::Sender<DispatchSnapshot>,
}

impl WatchProgress {
    pub fn channel(
        initial: DispatchSnapshot,
    ) -> (Self, watch::Receiver<DispatchSnapshot>) {
        let (tx, rx) = watch::channel(initial);
        (Self { tx }, rx)
    }
}

impl ProgressSink for WatchProgress {
    fn publish(&self, snapshot: DispatchSnapshot) {
        // Receivers may all be gone (UI dismissed); the run continues.
        let _ = self.tx.send(snapshot);
    }
}

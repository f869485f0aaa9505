use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, watch};
use uuid::Uuid;

use crate::domain::events::DispatchSnapshot;
use crate::domain::models::DispatchPhase;

/// Control handles for one dispatch: the cancel flag and the latest
/// snapshot. Kept after completion so the final tally stays readable.
pub struct DispatchHandle {
    pub company_id: Uuid,
    pub campaign_id: Uuid,
    pub cancel: watch::Sender<bool>,
    pub progress: watch::Receiver<DispatchSnapshot>,
}

#[derive(Default)]
pub struct DispatchRegistry {
    handles: Arc<RwLock<HashMap<Uuid, DispatchHandle>>>,
}

impl DispatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, dispatch_id: Uuid, handle: DispatchHandle) {
        let mut handles = self.handles.write().await;
        handles.insert(dispatch_id, handle);
    }

    pub async fn snapshot(&self, dispatch_id: &Uuid) -> Option<DispatchSnapshot> {
        let handles = self.handles.read().await;
        handles
            .get(dispatch_id)
            .map(|handle| handle.progress.borrow().clone())
    }

    pub async fn company_of(&self, dispatch_id: &Uuid) -> Option<Uuid> {
        let handles = self.handles.read().await;
        handles.get(dispatch_id).map(|handle| handle.company_id)
    }

    /// Raise the cancel flag. Returns false when the dispatch is unknown.
    /// Cancelling an already-finished run is a no-op.
    pub async fn cancel(&self, dispatch_id: &Uuid) -> bool {
        let handles = self.handles.read().await;
        match handles.get(dispatch_id) {
            Some(handle) => {
                handle.cancel.send_replace(true);
                true
            }
            None => false,
        }
    }

    /// Whether a campaign already has a run that has not reached a
    /// terminal phase.
    pub async fn has_running(&self, campaign_id: &Uuid) -> bool {
        let handles = self.handles.read().await;
        handles.values().any(|handle| {
            handle.campaign_id == *campaign_id
                && handle.progress.borrow().phase == DispatchPhase::Running
        })
    }
}

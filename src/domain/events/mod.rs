use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::models::recipient::DeliveryState;
use crate::domain::models::session::DispatchPhase;

/// Point-in-time view of a dispatch session, published by the dispatcher
/// after every state transition. Observers only ever read these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchSnapshot {
    pub dispatch_id: Uuid,
    pub campaign_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub phase: DispatchPhase,
    pub total: u32,
    pub current_index: u32,
    pub waiting_secs: Option<u64>,
    pub sent: u32,
    pub failed: u32,
    pub recipients: Vec<RecipientProgress>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipientProgress {
    pub name: String,
    pub address: String,
    pub state: DeliveryState,
}

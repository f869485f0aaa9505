use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::recipient::DeliveryState;

/// One durable row per completed send attempt. Written as the dispatch
/// proceeds so an interrupted run leaves a record of who was reached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryRecord {
    pub id: Uuid,
    pub dispatch_id: Uuid,
    pub campaign_id: Uuid,
    pub company_id: Uuid,
    pub address: String,
    pub recipient_name: String,
    pub state: DeliveryState,
    pub attempt: u32,
    pub created_at: DateTime<Utc>,
}

impl DeliveryRecord {
    pub fn new(
        dispatch_id: Uuid,
        campaign_id: Uuid,
        company_id: Uuid,
        address: String,
        recipient_name: String,
        state: DeliveryState,
        attempt: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            dispatch_id,
            campaign_id,
            company_id,
            address,
            recipient_name,
            state,
            attempt,
            created_at: Utc::now(),
        }
    }
}

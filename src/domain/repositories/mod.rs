use std::collections::HashSet;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::models::delivery::DeliveryRecord;
use crate::domain::models::{CampaignSettings, ChannelInstance};

#[async_trait]
pub trait DeliveryLogRepository: Send + Sync {
    /// One durable write per completed attempt, sent or failed.
    async fn record(&self, record: DeliveryRecord) -> anyhow::Result<()>;

    /// Addresses already reached for a campaign, so a re-run can skip
    /// them. Only successful deliveries count; failures stay retryable.
    async fn delivered_addresses(&self, campaign_id: Uuid) -> anyhow::Result<HashSet<String>>;

    async fn list_by_dispatch(&self, dispatch_id: Uuid) -> anyhow::Result<Vec<DeliveryRecord>>;
}

#[async_trait]
pub trait InstanceRepository: Send + Sync {
    async fn upsert(&self, instance: ChannelInstance) -> anyhow::Result<ChannelInstance>;
    async fn find_connected(&self, company_id: &Uuid) -> anyhow::Result<Option<ChannelInstance>>;
    async fn list_by_company(&self, company_id: &Uuid) -> anyhow::Result<Vec<ChannelInstance>>;
}

#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn get(&self, company_id: &Uuid) -> anyhow::Result<Option<CampaignSettings>>;
    async fn upsert(&self, settings: CampaignSettings) -> anyhow::Result<()>;
}

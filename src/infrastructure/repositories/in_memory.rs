use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{
    models::delivery::DeliveryRecord,
    models::{CampaignSettings, ChannelInstance, DeliveryState, InstanceStatus},
    repositories::{DeliveryLogRepository, InstanceRepository, SettingsRepository},
};

#[derive(Default)]
pub struct InMemoryDeliveryLogRepository {
    records: Arc<RwLock<Vec<DeliveryRecord>>>,
}

impl InMemoryDeliveryLogRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DeliveryLogRepository for InMemoryDeliveryLogRepository {
    async fn record(&self, record: DeliveryRecord) -> anyhow::Result<()> {
        let mut records = self.records.write().await;
        records.push(record);
        Ok(())
    }

    async fn delivered_addresses(&self, campaign_id: Uuid) -> anyhow::Result<HashSet<String>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| r.campaign_id == campaign_id && r.state == DeliveryState::Sent)
            .map(|r| r.address.clone())
            .collect())
    }

    async fn list_by_dispatch(&self, dispatch_id: Uuid) -> anyhow::Result<Vec<DeliveryRecord>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| r.dispatch_id == dispatch_id)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryInstanceRepository {
    instances: Arc<RwLock<HashMap<Uuid, ChannelInstance>>>,
}

impl InMemoryInstanceRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InstanceRepository for InMemoryInstanceRepository {
    async fn upsert(&self, mut instance: ChannelInstance) -> anyhow::Result<ChannelInstance> {
        instance.updated_at = Utc::now();
        let mut instances = self.instances.write().await;

        // a newly connected instance supersedes the previous one
        if instance.status == InstanceStatus::Connected {
            for existing in instances.values_mut() {
                if existing.company_id == instance.company_id
                    && existing.id != instance.id
                    && existing.status == InstanceStatus::Connected
                {
                    existing.status = InstanceStatus::Disconnected;
                    existing.updated_at = Utc::now();
                }
            }
        }

        instances.insert(instance.id, instance.clone());
        Ok(instance)
    }

    async fn find_connected(&self, company_id: &Uuid) -> anyhow::Result<Option<ChannelInstance>> {
        let instances = self.instances.read().await;
        Ok(instances
            .values()
            .filter(|i| i.company_id == *company_id && i.status == InstanceStatus::Connected)
            .max_by_key(|i| i.updated_at)
            .cloned())
    }

    async fn list_by_company(&self, company_id: &Uuid) -> anyhow::Result<Vec<ChannelInstance>> {
        let instances = self.instances.read().await;
        let mut result: Vec<ChannelInstance> = instances
            .values()
            .filter(|i| &i.company_id == company_id)
            .cloned()
            .collect();
        result.sort_by_key(|i| std::cmp::Reverse(i.updated_at));
        Ok(result)
    }
}

#[derive(Default)]
pub struct InMemorySettingsRepository {
    settings: Arc<RwLock<HashMap<Uuid, CampaignSettings>>>,
}

impl InMemorySettingsRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsRepository for InMemorySettingsRepository {
    async fn get(&self, company_id: &Uuid) -> anyhow::Result<Option<CampaignSettings>> {
        let settings = self.settings.read().await;
        Ok(settings.get(company_id).cloned())
    }

    async fn upsert(&self, mut settings: CampaignSettings) -> anyhow::Result<()> {
        settings.updated_at = Utc::now();
        let mut map = self.settings.write().await;
        map.insert(settings.company_id, settings);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(campaign_id: Uuid, address: &str, state: DeliveryState) -> DeliveryRecord {
        DeliveryRecord::new(
            Uuid::new_v4(),
            campaign_id,
            Uuid::new_v4(),
            address.to_string(),
            "Ana".to_string(),
            state,
            1,
        )
    }

    #[tokio::test]
    async fn delivered_addresses_only_count_successful_sends() {
        let repo = InMemoryDeliveryLogRepository::new();
        let campaign_id = Uuid::new_v4();
        repo.record(record(campaign_id, "11911111111", DeliveryState::Sent))
            .await
            .unwrap();
        repo.record(record(
            campaign_id,
            "11922222222",
            DeliveryState::Failed {
                reason: "timeout".to_string(),
            },
        ))
        .await
        .unwrap();
        repo.record(record(Uuid::new_v4(), "11933333333", DeliveryState::Sent))
            .await
            .unwrap();

        let delivered = repo.delivered_addresses(campaign_id).await.unwrap();
        assert_eq!(delivered.len(), 1);
        assert!(delivered.contains("11911111111"));
    }

    #[tokio::test]
    async fn list_by_dispatch_keeps_insertion_order() {
        let repo = InMemoryDeliveryLogRepository::new();
        let campaign_id = Uuid::new_v4();
        let mut first = record(campaign_id, "11911111111", DeliveryState::Sent);
        let dispatch_id = first.dispatch_id;
        let mut second = record(campaign_id, "11922222222", DeliveryState::Sent);
        second.dispatch_id = dispatch_id;
        first.attempt = 1;
        repo.record(first).await.unwrap();
        repo.record(second).await.unwrap();

        let records = repo.list_by_dispatch(dispatch_id).await.unwrap();
        let addresses: Vec<&str> = records.iter().map(|r| r.address.as_str()).collect();
        assert_eq!(addresses, vec!["11911111111", "11922222222"]);
    }

    fn instance(company_id: Uuid, name: &str, status: InstanceStatus) -> ChannelInstance {
        ChannelInstance {
            id: Uuid::new_v4(),
            company_id,
            name: name.to_string(),
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn newly_connected_instance_supersedes_previous() {
        let repo = InMemoryInstanceRepository::new();
        let company_id = Uuid::new_v4();
        let old = repo
            .upsert(instance(company_id, "antiga", InstanceStatus::Connected))
            .await
            .unwrap();
        let new = repo
            .upsert(instance(company_id, "nova", InstanceStatus::Connected))
            .await
            .unwrap();

        let connected = repo.find_connected(&company_id).await.unwrap().unwrap();
        assert_eq!(connected.id, new.id);

        let all = repo.list_by_company(&company_id).await.unwrap();
        let old_status = all.iter().find(|i| i.id == old.id).unwrap().status;
        assert_eq!(old_status, InstanceStatus::Disconnected);
    }

    #[tokio::test]
    async fn find_connected_ignores_other_companies() {
        let repo = InMemoryInstanceRepository::new();
        let company_id = Uuid::new_v4();
        repo.upsert(instance(Uuid::new_v4(), "outra", InstanceStatus::Connected))
            .await
            .unwrap();
        assert!(repo.find_connected(&company_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn settings_round_trip() {
        let repo = InMemorySettingsRepository::new();
        let company_id = Uuid::new_v4();
        assert!(repo.get(&company_id).await.unwrap().is_none());

        repo.upsert(CampaignSettings::fallback(company_id))
            .await
            .unwrap();
        let stored = repo.get(&company_id).await.unwrap().unwrap();
        assert_eq!(stored.company_id, company_id);
        assert!(!stored.templates.is_empty());
    }
}

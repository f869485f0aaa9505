use std::sync::Arc;

use uuid::Uuid;

use crate::{
    application::services::transport::TransportGateway,
    domain::{
        errors::DomainError,
        models::{ChannelType, GroupCandidate},
        repositories::InstanceRepository,
    },
};

/// Groups visible to the company's connected instance, for the broadcast
/// selection UI.
pub struct ListGroupsUseCase {
    instance_repo: Arc<dyn InstanceRepository>,
    gateway: TransportGateway,
}

impl ListGroupsUseCase {
    pub fn new(instance_repo: Arc<dyn InstanceRepository>, gateway: TransportGateway) -> Self {
        Self {
            instance_repo,
            gateway,
        }
    }

    pub async fn execute(&self, company_id: Uuid) -> Result<Vec<GroupCandidate>, DomainError> {
        let instance = self
            .instance_repo
            .find_connected(&company_id)
            .await?
            .ok_or_else(|| {
                DomainError::Precondition("no connected whatsapp instance".to_string())
            })?;

        let client = self.gateway.get(ChannelType::Whatsapp).ok_or_else(|| {
            DomainError::Precondition("no transport registered for whatsapp".to_string())
        })?;

        Ok(client.fetch_groups(&instance).await?)
    }
}

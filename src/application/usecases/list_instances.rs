use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{
    errors::DomainError, models::ChannelInstance, repositories::InstanceRepository,
};

pub struct ListInstancesUseCase {
    instance_repo: Arc<dyn InstanceRepository>,
}

impl ListInstancesUseCase {
    pub fn new(instance_repo: Arc<dyn InstanceRepository>) -> Self {
        Self { instance_repo }
    }

    pub async fn execute(&self, company_id: Uuid) -> Result<Vec<ChannelInstance>, DomainError> {
        Ok(self.instance_repo.list_by_company(&company_id).await?)
    }
}

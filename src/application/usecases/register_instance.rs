use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{
    errors::DomainError,
    models::{ChannelInstance, InstanceStatus},
    repositories::InstanceRepository,
};

pub struct RegisterInstanceUseCase {
    instance_repo: Arc<dyn InstanceRepository>,
}

pub struct RegisterInstanceRequest {
    pub company_id: Uuid,
    pub name: String,
    pub status: InstanceStatus,
}

impl RegisterInstanceUseCase {
    pub fn new(instance_repo: Arc<dyn InstanceRepository>) -> Self {
        Self { instance_repo }
    }

    pub async fn execute(
        &self,
        request: RegisterInstanceRequest,
    ) -> Result<ChannelInstance, DomainError> {
        if request.name.trim().is_empty() {
            return Err(DomainError::Validation(
                "instance name must not be empty".to_string(),
            ));
        }

        let now = Utc::now();
        let instance = ChannelInstance {
            id: Uuid::new_v4(),
            company_id: request.company_id,
            name: request.name,
            status: request.status,
            created_at: now,
            updated_at: now,
        };

        Ok(self.instance_repo.upsert(instance).await?)
    }
}

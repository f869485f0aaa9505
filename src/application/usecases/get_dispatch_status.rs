use std::sync::Arc;

use uuid::Uuid;

use crate::{
    application::services::registry::DispatchRegistry,
    domain::{errors::DomainError, events::DispatchSnapshot},
};

pub struct GetDispatchStatusUseCase {
    registry: Arc<DispatchRegistry>,
}

impl GetDispatchStatusUseCase {
    pub fn new(registry: Arc<DispatchRegistry>) -> Self {
        Self { registry }
    }

    pub async fn execute(
        &self,
        dispatch_id: Uuid,
        company_id: Uuid,
    ) -> Result<DispatchSnapshot, DomainError> {
        let owner = self
            .registry
            .company_of(&dispatch_id)
            .await
            .ok_or_else(|| DomainError::NotFound(format!("dispatch {dispatch_id}")))?;

        if owner != company_id {
            return Err(DomainError::Forbidden(
                "dispatch does not belong to company".to_string(),
            ));
        }

        self.registry
            .snapshot(&dispatch_id)
            .await
            .ok_or_else(|| DomainError::NotFound(format!("dispatch {dispatch_id}")))
    }
}

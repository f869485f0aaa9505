use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::{
    application::services::registry::DispatchRegistry, domain::errors::DomainError,
};

pub struct CancelDispatchUseCase {
    registry: Arc<DispatchRegistry>,
}

pub struct CancelDispatchRequest {
    pub company_id: Uuid,
    pub dispatch_id: Uuid,
}

impl CancelDispatchUseCase {
    pub fn new(registry: Arc<DispatchRegistry>) -> Self {
        Self { registry }
    }

    pub async fn execute(&self, request: CancelDispatchRequest) -> Result<(), DomainError> {
        let owner = self
            .registry
            .company_of(&request.dispatch_id)
            .await
            .ok_or_else(|| {
                DomainError::NotFound(format!("dispatch {}", request.dispatch_id))
            })?;

        if owner != request.company_id {
            return Err(DomainError::Forbidden(
                "dispatch does not belong to company".to_string(),
            ));
        }

        self.registry.cancel(&request.dispatch_id).await;
        info!(dispatch = %request.dispatch_id, "cancellation requested");
        Ok(())
    }
}
